//! Error types for Trellis Core

use thiserror::Error;

/// Result type alias using Trellis' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Trellis error types
///
/// Keys are generic over the graph, so they are carried here in their
/// `Debug` rendering.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown vertex: {0}")]
    UnknownVertex(String),

    #[error("Edge {key} exists with endpoints {existing}, cannot rebind to {requested}")]
    StructuralConflict {
        key: String,
        existing: String,
        requested: String,
    },

    #[error("Edge key already present: {0}")]
    EdgeKeyCollision(String),

    #[error("Tree node is the root and has no child index")]
    TreeRoot,

    #[error("Unknown tree node: {0}")]
    UnknownNode(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
