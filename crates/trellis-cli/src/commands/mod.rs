//! CLI command implementations

use std::path::Path;

use anyhow::Context;
use trellis_core::{Graph, GraphSnapshot};

pub mod completions;
pub mod config;
pub mod connections;
pub mod stats;
pub mod traverse;
pub mod vertex;

/// Graph shape read from snapshot files
pub type CliGraph = Graph<String, String, serde_json::Value, serde_json::Value>;

/// Read a JSON snapshot file into a graph
pub fn load_graph(path: &Path) -> anyhow::Result<CliGraph> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = GraphSnapshot::from_json(&json)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    let graph = Graph::from_snapshot(snapshot)
        .with_context(|| format!("Inconsistent snapshot {}", path.display()))?;
    tracing::info!("Loaded {} from {:?}", graph, path);
    Ok(graph)
}

/// Sorted copy of borrowed keys, for stable output
pub fn sorted<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut keys: Vec<String> = keys.cloned().collect();
    keys.sort();
    keys
}
