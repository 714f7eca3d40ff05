//! Labeled directed multigraph (the index store)
//!
//! A [`Graph`] owns a vertex table, an edge table and the derived indices
//! that make structural queries O(1) or O(degree):
//!
//! - outgoing edge keys per vertex
//! - incoming edge keys per vertex
//! - undirected neighbors per vertex
//! - connections: edge keys per directed `(source, target)` pair
//!
//! Every public mutation leaves all of them consistent with the tables.
//! Parallel edges and self-loops are allowed.

use crate::error::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// Bound shared by vertex keys and edge keys.
///
/// `Debug` is only used to render keys into error messages.
pub trait GraphKey: Eq + Hash + Clone + fmt::Debug {}

impl<T: Eq + Hash + Clone + fmt::Debug> GraphKey for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EdgeRecord<VK, EV> {
    source: VK,
    target: VK,
    value: Option<EV>,
}

/// Directed multigraph with caller-supplied vertex and edge keys.
///
/// Values are optional: a vertex or edge holding `None` exists, it just
/// carries no payload. Lookups return `Option<&Option<_>>` so "absent key"
/// and "absent value" stay distinguishable.
#[derive(Debug, Clone)]
pub struct Graph<VK, EK, VV = (), EV = ()> {
    vertices: HashMap<VK, Option<VV>>,
    edges: HashMap<EK, EdgeRecord<VK, EV>>,
    outgoing: HashMap<VK, HashSet<EK>>,
    incoming: HashMap<VK, HashSet<EK>>,
    neighbors: HashMap<VK, HashSet<VK>>,
    connections: HashMap<VK, HashMap<VK, HashSet<EK>>>,
}

/// A derived index disagreeing with the vertex and edge tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency(pub String);

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graph index inconsistency: {}", self.0)
    }
}

impl std::error::Error for Inconsistency {}

impl<VK, EK, VV, EV> Default for Graph<VK, EK, VV, EV> {
    fn default() -> Self {
        Self {
            vertices: HashMap::new(),
            edges: HashMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            neighbors: HashMap::new(),
            connections: HashMap::new(),
        }
    }
}

impl<VK: GraphKey, EK: GraphKey, VV, EV> Graph<VK, EK, VV, EV> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(vertex_count: usize, edge_count: usize) -> Self {
        Self {
            vertices: HashMap::with_capacity(vertex_count),
            edges: HashMap::with_capacity(edge_count),
            outgoing: HashMap::with_capacity(vertex_count),
            incoming: HashMap::with_capacity(vertex_count),
            neighbors: HashMap::with_capacity(vertex_count),
            connections: HashMap::with_capacity(vertex_count),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a vertex, or overwrite the value of an existing one.
    ///
    /// Passing `None` for an existing vertex is a no-op: a stored value is
    /// never reset to absent.
    pub fn add_vertex(&mut self, key: VK, value: Option<VV>) {
        match self.vertices.entry(key) {
            Entry::Occupied(mut slot) => {
                if value.is_some() {
                    *slot.get_mut() = value;
                }
            }
            Entry::Vacant(slot) => {
                let key = slot.key().clone();
                self.outgoing.insert(key.clone(), HashSet::new());
                self.incoming.insert(key.clone(), HashSet::new());
                self.neighbors.insert(key, HashSet::new());
                slot.insert(value);
            }
        }
    }

    /// Add an edge from `source` to `target`, creating missing endpoints
    /// with no value.
    ///
    /// Re-adding an existing key with the same endpoints updates its value
    /// (when one is given). Re-adding it with different endpoints fails with
    /// [`Error::StructuralConflict`] and leaves the graph untouched.
    pub fn add_edge(&mut self, key: EK, source: VK, target: VK, value: Option<EV>) -> Result<()> {
        if let Some(edge) = self.edges.get_mut(&key) {
            if edge.source != source || edge.target != target {
                return Err(Error::StructuralConflict {
                    key: format!("{:?}", key),
                    existing: format!("{:?} -> {:?}", edge.source, edge.target),
                    requested: format!("{:?} -> {:?}", source, target),
                });
            }
            if value.is_some() {
                edge.value = value;
            }
            return Ok(());
        }

        self.add_vertex(source.clone(), None);
        self.add_vertex(target.clone(), None);

        self.outgoing
            .entry(source.clone())
            .or_default()
            .insert(key.clone());
        self.incoming
            .entry(target.clone())
            .or_default()
            .insert(key.clone());
        self.neighbors
            .entry(source.clone())
            .or_default()
            .insert(target.clone());
        self.neighbors
            .entry(target.clone())
            .or_default()
            .insert(source.clone());
        self.connections
            .entry(source.clone())
            .or_default()
            .entry(target.clone())
            .or_default()
            .insert(key.clone());

        self.edges.insert(
            key,
            EdgeRecord {
                source,
                target,
                value,
            },
        );
        Ok(())
    }

    /// Remove an edge and return its value, or `None` if the key is unknown.
    ///
    /// The endpoints stop being neighbors only once no connection remains
    /// between them in either direction.
    pub fn remove_edge(&mut self, key: &EK) -> Option<Option<EV>> {
        let EdgeRecord {
            source,
            target,
            value,
        } = self.edges.remove(key)?;

        if let Some(out) = self.outgoing.get_mut(&source) {
            out.remove(key);
        }
        if let Some(inc) = self.incoming.get_mut(&target) {
            inc.remove(key);
        }
        self.disconnect(&source, &target, key);

        if !self.has_connection(&source, &target) && !self.has_connection(&target, &source) {
            if let Some(adjacent) = self.neighbors.get_mut(&source) {
                adjacent.remove(&target);
            }
            if let Some(adjacent) = self.neighbors.get_mut(&target) {
                adjacent.remove(&source);
            }
        }

        Some(value)
    }

    /// Remove a vertex and every edge incident to it, returning the vertex
    /// value, or `None` if the key is unknown.
    pub fn remove_vertex(&mut self, key: &VK) -> Option<Option<VV>> {
        if !self.vertices.contains_key(key) {
            return None;
        }

        // Collected up front: remove_edge mutates the sets being read here.
        let incident: HashSet<EK> = self
            .iter_outgoing_edges(key)
            .chain(self.iter_incoming_edges(key))
            .cloned()
            .collect();

        if !incident.is_empty() {
            tracing::debug!(
                "Removing vertex {:?} cascades to {} edges",
                key,
                incident.len()
            );
        }

        for edge in &incident {
            self.remove_edge(edge);
        }

        self.outgoing.remove(key);
        self.incoming.remove(key);
        if let Some(adjacent) = self.neighbors.remove(key) {
            for other in &adjacent {
                if let Some(set) = self.neighbors.get_mut(other) {
                    set.remove(key);
                }
            }
        }

        self.vertices.remove(key)
    }

    /// Remove all vertices, edges and values.
    pub fn clear(&mut self) {
        tracing::debug!(
            "Clearing graph with {} vertices and {} edges",
            self.vertices.len(),
            self.edges.len()
        );
        self.vertices.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.incoming.clear();
        self.neighbors.clear();
        self.connections.clear();
    }

    fn disconnect(&mut self, source: &VK, target: &VK, key: &EK) {
        if let Some(by_target) = self.connections.get_mut(source) {
            if let Some(keys) = by_target.get_mut(target) {
                keys.remove(key);
                if keys.is_empty() {
                    by_target.remove(target);
                }
            }
            if by_target.is_empty() {
                self.connections.remove(source);
            }
        }
    }

    fn has_connection(&self, source: &VK, target: &VK) -> bool {
        self.connections
            .get(source)
            .is_some_and(|by_target| by_target.contains_key(target))
    }

    fn require_vertex(&self, key: &VK) -> Result<()> {
        if self.vertices.contains_key(key) {
            Ok(())
        } else {
            Err(Error::UnknownVertex(format!("{:?}", key)))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Vertex queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Value of a vertex; `None` if the vertex does not exist.
    pub fn get_vertex(&self, key: &VK) -> Option<&Option<VV>> {
        self.vertices.get(key)
    }

    pub fn is_vertex(&self, key: &VK) -> bool {
        self.vertices.contains_key(key)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = &VK> + '_ {
        self.vertices.keys()
    }

    pub fn iter_vertex_values(&self) -> impl Iterator<Item = Option<&VV>> + '_ {
        self.vertices.values().map(Option::as_ref)
    }

    /// All `(key, value)` pairs.
    pub fn iter_vertex_entries(&self) -> impl Iterator<Item = (&VK, Option<&VV>)> + '_ {
        self.vertices.iter().map(|(key, value)| (key, value.as_ref()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edge queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Value of an edge; `None` if the edge does not exist.
    pub fn get_edge(&self, key: &EK) -> Option<&Option<EV>> {
        self.edges.get(key).map(|edge| &edge.value)
    }

    pub fn is_edge(&self, key: &EK) -> bool {
        self.edges.contains_key(key)
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = &EK> + '_ {
        self.edges.keys()
    }

    pub fn iter_edge_values(&self) -> impl Iterator<Item = Option<&EV>> + '_ {
        self.edges.values().map(|edge| edge.value.as_ref())
    }

    /// All `(key, source, target, value)` quadruples.
    pub fn iter_edge_entries(&self) -> impl Iterator<Item = (&EK, &VK, &VK, Option<&EV>)> + '_ {
        self.edges
            .iter()
            .map(|(key, edge)| (key, &edge.source, &edge.target, edge.value.as_ref()))
    }

    pub fn get_source(&self, edge_key: &EK) -> Option<&VK> {
        self.edges.get(edge_key).map(|edge| &edge.source)
    }

    pub fn get_target(&self, edge_key: &EK) -> Option<&VK> {
        self.edges.get(edge_key).map(|edge| &edge.target)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Incidence queries
    //
    // An unknown vertex has no incident edges and no neighbors.
    // ─────────────────────────────────────────────────────────────────────────

    pub fn iter_outgoing_edges(&self, vertex: &VK) -> impl Iterator<Item = &EK> + '_ {
        self.outgoing.get(vertex).into_iter().flatten()
    }

    pub fn iter_incoming_edges(&self, vertex: &VK) -> impl Iterator<Item = &EK> + '_ {
        self.incoming.get(vertex).into_iter().flatten()
    }

    /// Target of every outgoing edge; repeats once per parallel edge.
    pub fn iter_target_vertices(&self, vertex: &VK) -> impl Iterator<Item = &VK> + '_ {
        self.iter_outgoing_edges(vertex)
            .filter_map(move |edge| self.get_target(edge))
    }

    /// Source of every incoming edge; repeats once per parallel edge.
    pub fn iter_source_vertices(&self, vertex: &VK) -> impl Iterator<Item = &VK> + '_ {
        self.iter_incoming_edges(vertex)
            .filter_map(move |edge| self.get_source(edge))
    }

    pub fn outdegree(&self, vertex: &VK) -> usize {
        self.outgoing.get(vertex).map_or(0, HashSet::len)
    }

    pub fn indegree(&self, vertex: &VK) -> usize {
        self.incoming.get(vertex).map_or(0, HashSet::len)
    }

    /// Vertices joined to `vertex` by an edge in either direction.
    pub fn iter_neighbors(&self, vertex: &VK) -> impl Iterator<Item = &VK> + '_ {
        self.neighbors.get(vertex).into_iter().flatten()
    }

    /// Number of distinct neighbors (not the number of incident edges).
    pub fn degree(&self, vertex: &VK) -> usize {
        self.neighbors.get(vertex).map_or(0, HashSet::len)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connection queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Edge keys directed from `source` to `target`.
    ///
    /// Fails with [`Error::UnknownVertex`] if either endpoint is not in the
    /// graph.
    pub fn iter_connections(
        &self,
        source: &VK,
        target: &VK,
    ) -> Result<impl Iterator<Item = &EK> + '_> {
        self.require_vertex(source)?;
        self.require_vertex(target)?;
        Ok(self
            .connections
            .get(source)
            .and_then(|by_target| by_target.get(target))
            .into_iter()
            .flatten())
    }

    pub fn num_connections(&self, source: &VK, target: &VK) -> Result<usize> {
        self.require_vertex(source)?;
        self.require_vertex(target)?;
        Ok(self
            .connections
            .get(source)
            .and_then(|by_target| by_target.get(target))
            .map_or(0, HashSet::len))
    }

    /// Whether at least one edge joins `source` and `target`, in either
    /// direction.
    pub fn is_adjacent(&self, source: &VK, target: &VK) -> Result<bool> {
        self.require_vertex(source)?;
        self.require_vertex(target)?;
        Ok(self.has_connection(source, target) || self.has_connection(target, source))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────────

    /// Recompute every derived index from the vertex and edge tables and
    /// compare against the maintained ones.
    pub fn check_consistency(&self) -> std::result::Result<(), Inconsistency> {
        let mut outgoing: HashMap<&VK, HashSet<&EK>> = HashMap::new();
        let mut incoming: HashMap<&VK, HashSet<&EK>> = HashMap::new();
        let mut neighbors: HashMap<&VK, HashSet<&VK>> = HashMap::new();
        let mut connections: HashMap<(&VK, &VK), HashSet<&EK>> = HashMap::new();

        for (key, edge) in &self.edges {
            if !self.vertices.contains_key(&edge.source) || !self.vertices.contains_key(&edge.target)
            {
                return Err(Inconsistency(format!(
                    "edge {:?} has a dangling endpoint",
                    key
                )));
            }
            outgoing.entry(&edge.source).or_default().insert(key);
            incoming.entry(&edge.target).or_default().insert(key);
            neighbors.entry(&edge.source).or_default().insert(&edge.target);
            neighbors.entry(&edge.target).or_default().insert(&edge.source);
            connections
                .entry((&edge.source, &edge.target))
                .or_default()
                .insert(key);
        }

        let vertex_count = self.vertices.len();
        if self.outgoing.len() != vertex_count
            || self.incoming.len() != vertex_count
            || self.neighbors.len() != vertex_count
        {
            return Err(Inconsistency(
                "per-vertex indices do not cover exactly the vertex table".to_string(),
            ));
        }

        for vertex in self.vertices.keys() {
            let actual: HashSet<&EK> = self.iter_outgoing_edges(vertex).collect();
            if actual != outgoing.remove(vertex).unwrap_or_default() {
                return Err(Inconsistency(format!(
                    "outgoing edges of {:?} disagree",
                    vertex
                )));
            }

            let actual: HashSet<&EK> = self.iter_incoming_edges(vertex).collect();
            if actual != incoming.remove(vertex).unwrap_or_default() {
                return Err(Inconsistency(format!(
                    "incoming edges of {:?} disagree",
                    vertex
                )));
            }

            let actual: HashSet<&VK> = self.iter_neighbors(vertex).collect();
            if actual != neighbors.remove(vertex).unwrap_or_default() {
                return Err(Inconsistency(format!("neighbors of {:?} disagree", vertex)));
            }
        }

        let actual: HashMap<(&VK, &VK), HashSet<&EK>> = self
            .connections
            .iter()
            .flat_map(|(source, by_target)| {
                by_target
                    .iter()
                    .map(move |(target, keys)| ((source, target), keys.iter().collect::<HashSet<_>>()))
            })
            .collect();
        if actual != connections {
            return Err(Inconsistency("connections disagree".to_string()));
        }

        Ok(())
    }
}

impl<VK: GraphKey, EK: GraphKey, VV: PartialEq, EV: PartialEq> PartialEq
    for Graph<VK, EK, VV, EV>
{
    /// Graphs are equal when their vertex and edge tables are; the derived
    /// indices are a function of those.
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.edges == other.edges
    }
}

impl<VK: GraphKey, EK: GraphKey, VV: Eq, EV: Eq> Eq for Graph<VK, EK, VV, EV> {}

impl<VK: GraphKey, EK: GraphKey, VV, EV> fmt::Display for Graph<VK, EK, VV, EV> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Graph with {} vertices and {} edges",
            self.num_vertices(),
            self.num_edges()
        )
    }
}
