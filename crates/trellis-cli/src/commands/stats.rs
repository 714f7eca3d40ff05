//! Stats command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{load_graph, CliGraph};
use crate::output::{format_output, Table};
use crate::AppContext;

#[derive(Args)]
pub struct StatsArgs {
    /// Snapshot file (JSON)
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub vertices: usize,
    pub edges: usize,
    pub self_loops: usize,
    pub isolated: usize,
    pub max_degree: Option<MaxDegree>,
}

#[derive(Debug, Serialize)]
pub struct MaxDegree {
    pub vertex: String,
    pub degree: usize,
}

impl Stats {
    pub fn of(graph: &CliGraph) -> Self {
        let self_loops = graph
            .iter_edge_entries()
            .filter(|(_, source, target, _)| source == target)
            .count();
        let isolated = graph
            .iter_vertices()
            .filter(|v| graph.degree(v) == 0)
            .count();
        // Ties go to the smallest key so output is stable.
        let max_degree = graph
            .iter_vertices()
            .map(|v| (graph.degree(v), v))
            .max_by(|(da, a), (db, b)| da.cmp(db).then_with(|| b.cmp(a)))
            .map(|(degree, vertex)| MaxDegree {
                vertex: vertex.clone(),
                degree,
            });

        Self {
            vertices: graph.num_vertices(),
            edges: graph.num_edges(),
            self_loops,
            isolated,
            max_degree,
        }
    }
}

impl Table for Stats {
    fn table(&self) -> String {
        let mut lines = vec![
            format!("Vertices:    {}", self.vertices),
            format!("Edges:       {}", self.edges),
            format!("Self loops:  {}", self.self_loops),
            format!("Isolated:    {}", self.isolated),
        ];
        match &self.max_degree {
            Some(max) => lines.push(format!("Max degree:  {} ({})", max.degree, max.vertex)),
            None => lines.push("Max degree:  -".to_string()),
        }
        lines.join("\n")
    }
}

pub fn run(args: &StatsArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let stats = Stats::of(&graph);
    println!("{}", format_output(&stats, ctx.format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counts() {
        let mut graph = CliGraph::new();
        graph.add_edge("ab".into(), "a".into(), "b".into(), None).unwrap();
        graph.add_edge("ac".into(), "a".into(), "c".into(), None).unwrap();
        graph.add_edge("bb".into(), "b".into(), "b".into(), None).unwrap();
        graph.add_vertex("lonely".into(), None);

        let stats = Stats::of(&graph);
        assert_eq!(stats.vertices, 4);
        assert_eq!(stats.edges, 3);
        assert_eq!(stats.self_loops, 1);
        assert_eq!(stats.isolated, 1);
        let max = stats.max_degree.unwrap();
        assert_eq!(max.degree, 2);
        assert_eq!(max.vertex, "a");
    }

    #[test]
    fn test_stats_empty() {
        let stats = Stats::of(&CliGraph::new());
        assert_eq!(stats.vertices, 0);
        assert!(stats.max_degree.is_none());
        assert!(stats.table().contains("Max degree:  -"));
    }
}
