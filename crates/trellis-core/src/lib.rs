//! Trellis Core - Labeled directed multigraph
//!
//! This crate provides an index-backed multigraph with constant-time
//! structural queries, lazy breadth-first and depth-first traversal, a flat
//! snapshot form for interchange, and a rooted tree that exports itself as
//! a graph.

pub mod error;
pub mod graph;
pub mod snapshot;
pub mod traversal;
pub mod tree;


pub use error::{Error, Result};
pub use graph::{Graph, GraphKey, Inconsistency};
pub use snapshot::GraphSnapshot;
pub use traversal::{Bfs, Color, Dfs, Expansion, Fifo, Frontier, Lifo, Traversal};
pub use tree::{NodeId, Tree};
