//! Flat interchange form of a graph
//!
//! A snapshot is the pair `(vertices, edges)` where every vertex is a
//! `(key, value)` pair and every edge a `(key, source, target, value)`
//! quadruple. Tuples serialize as JSON arrays.

use crate::error::{Error, Result};
use crate::graph::{Graph, GraphKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Graph contents as plain vertex and edge tuples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot<VK, EK, VV = (), EV = ()> {
    #[serde(default = "Vec::new")]
    pub vertices: Vec<(VK, Option<VV>)>,
    #[serde(default = "Vec::new")]
    pub edges: Vec<(EK, VK, VK, Option<EV>)>,
}

impl<VK, EK, VV, EV> Default for GraphSnapshot<VK, EK, VV, EV> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl<VK, EK, VV, EV> GraphSnapshot<VK, EK, VV, EV> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertices(mut self, vertices: Vec<(VK, Option<VV>)>) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn with_edges(mut self, edges: Vec<(EK, VK, VK, Option<EV>)>) -> Self {
        self.edges = edges;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }
}

impl<VK, EK, VV, EV> GraphSnapshot<VK, EK, VV, EV>
where
    VK: Serialize + DeserializeOwned,
    EK: Serialize + DeserializeOwned,
    VV: Serialize + DeserializeOwned,
    EV: Serialize + DeserializeOwned,
{
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<VK: GraphKey, EK: GraphKey, VV: Clone, EV: Clone> Graph<VK, EK, VV, EV> {
    /// Export every vertex and edge with its value.
    pub fn to_snapshot(&self) -> GraphSnapshot<VK, EK, VV, EV> {
        GraphSnapshot {
            vertices: self
                .iter_vertex_entries()
                .map(|(key, value)| (key.clone(), value.cloned()))
                .collect(),
            edges: self
                .iter_edge_entries()
                .map(|(key, source, target, value)| {
                    (key.clone(), source.clone(), target.clone(), value.cloned())
                })
                .collect(),
        }
    }
}

impl<VK: GraphKey, EK: GraphKey, VV, EV> Graph<VK, EK, VV, EV> {
    /// Build a fresh graph from a snapshot.
    pub fn from_snapshot(snapshot: GraphSnapshot<VK, EK, VV, EV>) -> Result<Self> {
        let mut graph = Self::with_capacity(snapshot.vertices.len(), snapshot.edges.len());
        graph.load_snapshot(snapshot)?;
        Ok(graph)
    }

    /// Merge a snapshot into this graph.
    ///
    /// Fails without touching the graph if any snapshot edge key is already
    /// present ([`Error::EdgeKeyCollision`]) or if the snapshot binds one
    /// edge key to two different endpoint pairs
    /// ([`Error::StructuralConflict`]). Clear the graph first to replace its
    /// contents.
    pub fn load_snapshot(&mut self, snapshot: GraphSnapshot<VK, EK, VV, EV>) -> Result<()> {
        let mut bound: HashMap<&EK, (&VK, &VK)> = HashMap::with_capacity(snapshot.edges.len());
        for (key, source, target, _) in &snapshot.edges {
            if self.is_edge(key) {
                return Err(Error::EdgeKeyCollision(format!("{:?}", key)));
            }
            if let Some((existing_source, existing_target)) = bound.insert(key, (source, target)) {
                if existing_source != source || existing_target != target {
                    return Err(Error::StructuralConflict {
                        key: format!("{:?}", key),
                        existing: format!("{:?} -> {:?}", existing_source, existing_target),
                        requested: format!("{:?} -> {:?}", source, target),
                    });
                }
            }
        }

        tracing::debug!(
            "Loading snapshot with {} vertices and {} edges",
            snapshot.vertices.len(),
            snapshot.edges.len()
        );

        for (key, value) in snapshot.vertices {
            self.add_vertex(key, value);
        }
        for (key, source, target, value) in snapshot.edges {
            // Validated above: every key is new or repeats its own endpoints
            self.add_edge(key, source, target, value)?;
        }
        Ok(())
    }
}
