//! Connections command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{load_graph, sorted, CliGraph};
use crate::output::{format_output, Table};
use crate::AppContext;

#[derive(Args)]
pub struct ConnectionsArgs {
    /// Snapshot file (JSON)
    pub file: PathBuf,
    /// Source vertex
    pub source: String,
    /// Target vertex
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct Connections {
    pub source: String,
    pub target: String,
    pub edges: Vec<String>,
}

impl Connections {
    pub fn of(graph: &CliGraph, source: &str, target: &str) -> anyhow::Result<Self> {
        let source = source.to_string();
        let target = target.to_string();
        let edges = sorted(graph.iter_connections(&source, &target)?);
        Ok(Self {
            source,
            target,
            edges,
        })
    }
}

impl Table for Connections {
    fn table(&self) -> String {
        if self.edges.is_empty() {
            return format!("No edges from {} to {}", self.source, self.target);
        }
        self.edges.join("\n")
    }
}

pub fn run(args: &ConnectionsArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let connections = Connections::of(&graph, &args.source, &args.target)?;
    println!("{}", format_output(&connections, ctx.format)?);
    Ok(())
}
