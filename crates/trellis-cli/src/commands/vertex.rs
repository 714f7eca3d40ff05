//! Vertex command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{load_graph, sorted, CliGraph};
use crate::output::{cell, format_output, Table};
use crate::AppContext;

#[derive(Args)]
pub struct VertexArgs {
    /// Snapshot file (JSON)
    pub file: PathBuf,
    /// Vertex key
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct IncidentEdge {
    pub edge: String,
    pub vertex: String,
}

#[derive(Debug, Serialize)]
pub struct VertexReport {
    pub key: String,
    pub value: Option<serde_json::Value>,
    pub outgoing: Vec<IncidentEdge>,
    pub incoming: Vec<IncidentEdge>,
    pub neighbors: Vec<String>,
    pub outdegree: usize,
    pub indegree: usize,
    pub degree: usize,
}

impl VertexReport {
    pub fn of(graph: &CliGraph, key: &str) -> anyhow::Result<Self> {
        let key = key.to_string();
        let Some(value) = graph.get_vertex(&key) else {
            anyhow::bail!("Vertex not found: {}", key);
        };

        let outgoing = sorted(graph.iter_outgoing_edges(&key))
            .into_iter()
            .filter_map(|edge| {
                let vertex = graph.get_target(&edge)?.clone();
                Some(IncidentEdge { edge, vertex })
            })
            .collect();
        let incoming = sorted(graph.iter_incoming_edges(&key))
            .into_iter()
            .filter_map(|edge| {
                let vertex = graph.get_source(&edge)?.clone();
                Some(IncidentEdge { edge, vertex })
            })
            .collect();

        Ok(Self {
            value: value.clone(),
            outgoing,
            incoming,
            neighbors: sorted(graph.iter_neighbors(&key)),
            outdegree: graph.outdegree(&key),
            indegree: graph.indegree(&key),
            degree: graph.degree(&key),
            key,
        })
    }
}

impl Table for VertexReport {
    fn table(&self) -> String {
        let mut lines = vec![
            format!("Vertex: {}", self.key),
            format!("Value:  {}", cell(self.value.as_ref())),
            format!(
                "Degree: {} (out {}, in {})",
                self.degree, self.outdegree, self.indegree
            ),
        ];
        lines.push(String::new());
        lines.push("Outgoing:".to_string());
        for e in &self.outgoing {
            lines.push(format!("  {} -> {}", e.edge, e.vertex));
        }
        lines.push("Incoming:".to_string());
        for e in &self.incoming {
            lines.push(format!("  {} <- {}", e.edge, e.vertex));
        }
        lines.push(format!("Neighbors: {}", self.neighbors.join(", ")));
        lines.join("\n")
    }
}

pub fn run(args: &VertexArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let report = VertexReport::of(&graph, &args.key)?;
    println!("{}", format_output(&report, ctx.format)?);
    Ok(())
}
