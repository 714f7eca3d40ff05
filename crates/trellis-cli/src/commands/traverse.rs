//! Traverse command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use trellis_core::{Expansion, Fifo, Lifo, Traversal};

use super::{load_graph, CliGraph};
use crate::config::Order;
use crate::output::{format_output, Table};
use crate::AppContext;

#[derive(Args)]
pub struct TraverseArgs {
    /// Snapshot file (JSON)
    pub file: PathBuf,

    /// Root vertices, seeded in the given order
    #[arg(required = true)]
    pub roots: Vec<String>,

    /// Traversal order (defaults to the configured order)
    #[arg(short, long)]
    pub order: Option<Order>,

    /// Follow edges from source to target only
    #[arg(long, conflicts_with = "undirected")]
    pub directed: bool,

    /// Follow edges in both directions
    #[arg(long)]
    pub undirected: bool,

    /// Stop after this many vertices
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Visit {
    pub order: Order,
    pub expansion: Expansion,
    pub vertices: Vec<String>,
}

impl Table for Visit {
    fn table(&self) -> String {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:>4}  {}", i, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn visit(
    graph: &CliGraph,
    roots: &[String],
    order: Order,
    expansion: Expansion,
    limit: Option<usize>,
) -> Visit {
    let roots = roots.iter().cloned();
    let walk: Box<dyn Iterator<Item = String> + '_> = match order {
        Order::Bfs => Box::new(Traversal::new(graph, roots, expansion, Fifo::default())),
        Order::Dfs => Box::new(Traversal::new(graph, roots, expansion, Lifo::default())),
    };
    let vertices = walk.take(limit.unwrap_or(usize::MAX)).collect();
    Visit {
        order,
        expansion,
        vertices,
    }
}

pub fn run(args: &TraverseArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;

    let order = args.order.unwrap_or(ctx.config.order);
    let directed = match (args.directed, args.undirected) {
        (true, _) => true,
        (_, true) => false,
        _ => ctx.config.directed,
    };
    let expansion = if directed {
        Expansion::Directed
    } else {
        Expansion::Undirected
    };
    tracing::debug!("Traversing with {:?} / {:?}", order, expansion);

    let result = visit(&graph, &args.roots, order, expansion, args.limit);
    println!("{}", format_output(&result, ctx.format)?);
    Ok(())
}
