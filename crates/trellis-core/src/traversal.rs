//! Lazy graph traversal with tricolor marking
//!
//! A [`Traversal`] is an iterator owning its own frontier and color sets, so
//! any number of traversals can run over the same graph at once. It holds a
//! shared borrow of the graph; the graph cannot be mutated until every
//! traversal over it has been dropped.
//!
//! Vertices move White → Gray (discovered, waiting in the frontier) →
//! Black (yielded). Each vertex is yielded exactly once. The expansion of a
//! yielded vertex is deferred until the next pull, so abandoning a traversal
//! never does work nobody asked for.

use crate::graph::{Graph, GraphKey};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::iter::FusedIterator;

/// Discovery state of a vertex within one traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Not yet discovered
    White,
    /// Discovered, waiting in the frontier
    Gray,
    /// Yielded and expanded (or about to be expanded)
    Black,
}

/// Which vertices count as the next step from a vertex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expansion {
    /// Neighbors in either direction
    #[default]
    Undirected,
    /// Targets of outgoing edges only
    Directed,
}

/// Pending-work collection driving a traversal
pub trait Frontier<K> {
    fn push(&mut self, key: K);

    fn pop(&mut self) -> Option<K>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First-in first-out frontier (breadth-first order)
#[derive(Debug, Clone)]
pub struct Fifo<K>(VecDeque<K>);

impl<K> Default for Fifo<K> {
    fn default() -> Self {
        Self(VecDeque::new())
    }
}

impl<K> Frontier<K> for Fifo<K> {
    fn push(&mut self, key: K) {
        self.0.push_back(key);
    }

    fn pop(&mut self) -> Option<K> {
        self.0.pop_front()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Last-in first-out frontier (depth-first order)
#[derive(Debug, Clone)]
pub struct Lifo<K>(Vec<K>);

impl<K> Default for Lifo<K> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<K> Frontier<K> for Lifo<K> {
    fn push(&mut self, key: K) {
        self.0.push(key);
    }

    fn pop(&mut self) -> Option<K> {
        self.0.pop()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Breadth-first traversal
pub type Bfs<'g, VK, EK, VV, EV> = Traversal<'g, VK, EK, VV, EV, Fifo<VK>>;

/// Depth-first traversal
pub type Dfs<'g, VK, EK, VV, EV> = Traversal<'g, VK, EK, VV, EV, Lifo<VK>>;

/// Single-pass iterator over the vertices reachable from a set of roots.
///
/// Roots that are not in the graph are yielded once and contribute no
/// neighbors.
pub struct Traversal<'g, VK, EK, VV, EV, F> {
    graph: &'g Graph<VK, EK, VV, EV>,
    expansion: Expansion,
    frontier: F,
    gray: HashSet<VK>,
    black: HashSet<VK>,
    /// Yielded on the previous pull, not yet expanded
    last: Option<VK>,
}

impl<'g, VK, EK, VV, EV, F> Traversal<'g, VK, EK, VV, EV, F>
where
    VK: GraphKey,
    EK: GraphKey,
    F: Frontier<VK>,
{
    /// Seed a traversal: every distinct root becomes gray and enters the
    /// frontier in the order given.
    pub fn new<I>(
        graph: &'g Graph<VK, EK, VV, EV>,
        roots: I,
        expansion: Expansion,
        mut frontier: F,
    ) -> Self
    where
        I: IntoIterator<Item = VK>,
    {
        let mut gray = HashSet::new();
        for root in roots {
            if gray.insert(root.clone()) {
                frontier.push(root);
            }
        }

        tracing::trace!(
            "Starting {:?} traversal from {} roots",
            expansion,
            gray.len()
        );

        Self {
            graph,
            expansion,
            frontier,
            gray,
            black: HashSet::new(),
            last: None,
        }
    }

    pub fn color(&self, vertex: &VK) -> Color {
        if self.black.contains(vertex) {
            Color::Black
        } else if self.gray.contains(vertex) {
            Color::Gray
        } else {
            Color::White
        }
    }

    /// Number of vertices yielded so far
    pub fn num_visited(&self) -> usize {
        self.black.len()
    }

    /// Number of discovered vertices still waiting in the frontier
    pub fn num_pending(&self) -> usize {
        self.frontier.len()
    }

    fn discover(&mut self, vertex: &VK) {
        if self.color(vertex) == Color::White {
            self.gray.insert(vertex.clone());
            self.frontier.push(vertex.clone());
        }
    }

    fn expand(&mut self, vertex: &VK) {
        let graph = self.graph;
        match self.expansion {
            Expansion::Undirected => {
                for next in graph.iter_neighbors(vertex) {
                    self.discover(next);
                }
            }
            Expansion::Directed => {
                for next in graph.iter_target_vertices(vertex) {
                    self.discover(next);
                }
            }
        }
    }
}

impl<'g, VK, EK, VV, EV, F> Iterator for Traversal<'g, VK, EK, VV, EV, F>
where
    VK: GraphKey,
    EK: GraphKey,
    F: Frontier<VK>,
{
    type Item = VK;

    fn next(&mut self) -> Option<VK> {
        if let Some(previous) = self.last.take() {
            self.expand(&previous);
        }

        let vertex = self.frontier.pop()?;
        let was_gray = self.gray.remove(&vertex);
        debug_assert!(was_gray, "frontier held a vertex that was not gray");
        self.black.insert(vertex.clone());
        self.last = Some(vertex.clone());
        Some(vertex)
    }
}

impl<'g, VK, EK, VV, EV, F> FusedIterator for Traversal<'g, VK, EK, VV, EV, F>
where
    VK: GraphKey,
    EK: GraphKey,
    F: Frontier<VK>,
{
}

impl<VK: GraphKey, EK: GraphKey, VV, EV> Graph<VK, EK, VV, EV> {
    /// Vertices connected to any root, breadth-first, ignoring direction.
    pub fn bfs_undirected<I>(&self, roots: I) -> Bfs<'_, VK, EK, VV, EV>
    where
        I: IntoIterator<Item = VK>,
    {
        Traversal::new(self, roots, Expansion::Undirected, Fifo::default())
    }

    /// Vertices on directed paths from any root, breadth-first.
    pub fn bfs_directed<I>(&self, roots: I) -> Bfs<'_, VK, EK, VV, EV>
    where
        I: IntoIterator<Item = VK>,
    {
        Traversal::new(self, roots, Expansion::Directed, Fifo::default())
    }

    /// Vertices connected to any root, depth-first, ignoring direction.
    pub fn dfs_undirected<I>(&self, roots: I) -> Dfs<'_, VK, EK, VV, EV>
    where
        I: IntoIterator<Item = VK>,
    {
        Traversal::new(self, roots, Expansion::Undirected, Lifo::default())
    }

    /// Vertices on directed paths from any root, depth-first.
    pub fn dfs_directed<I>(&self, roots: I) -> Dfs<'_, VK, EK, VV, EV>
    where
        I: IntoIterator<Item = VK>,
    {
        Traversal::new(self, roots, Expansion::Directed, Lifo::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> Graph<&'static str, &'static str> {
        // a -> b -> e
        // a -> c -> f
        // a -> d -> g
        let mut g = Graph::new();
        for (key, source, target) in [
            ("ab", "a", "b"),
            ("ac", "a", "c"),
            ("ad", "a", "d"),
            ("be", "b", "e"),
            ("cf", "c", "f"),
            ("dg", "d", "g"),
        ] {
            g.add_edge(key, source, target, None).unwrap();
        }
        g
    }

    fn as_set<'a>(items: &[&'a str]) -> HashSet<&'a str> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_bfs_level_ordering() {
        let g = create_test_graph();
        let order: Vec<&str> = g.bfs_directed(["a"]).collect();

        assert_eq!(order.len(), 7);
        assert_eq!(order[0], "a");
        assert_eq!(as_set(&order[1..4]), as_set(&["b", "c", "d"]));
        assert_eq!(as_set(&order[4..7]), as_set(&["e", "f", "g"]));
    }

    #[test]
    fn test_dfs_follows_branches() {
        let g = create_test_graph();
        let order: Vec<&str> = g.dfs_directed(["a"]).collect();

        assert_eq!(order[0], "a");
        assert_eq!(
            as_set(&[order[1], order[3], order[5]]),
            as_set(&["b", "c", "d"])
        );
        assert_eq!(
            as_set(&[order[2], order[4], order[6]]),
            as_set(&["e", "f", "g"])
        );
        // Each leaf directly follows its parent
        for pair in [(1, 2), (3, 4), (5, 6)] {
            let edge = format!("{}{}", order[pair.0], order[pair.1]);
            assert!(g.iter_edges().any(|e| **e == edge));
        }
    }

    #[test]
    fn test_dfs_long_chain_descends() {
        let mut g: Graph<i32, String> = Graph::new();
        for i in 2..1000 {
            let j = i - 1;
            g.add_edge(format!("{}|{}", j, i), i, j, None).unwrap();
        }

        let order: Vec<i32> = g.dfs_directed([999]).collect();
        assert_eq!(order.len(), 999);
        assert!(order.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_directed_ignores_reverse_edges() {
        let g = create_test_graph();

        let directed: HashSet<&str> = g.bfs_directed(["b"]).collect();
        assert_eq!(directed, as_set(&["b", "e"]));

        let undirected: HashSet<&str> = g.bfs_undirected(["b"]).collect();
        assert_eq!(undirected, as_set(&["a", "b", "c", "d", "e", "f", "g"]));

        let undirected: HashSet<&str> = g.dfs_undirected(["g"]).collect();
        assert_eq!(undirected.len(), 7);
    }

    #[test]
    fn test_cycles_yield_each_vertex_once() {
        let mut g: Graph<i32, i32> = Graph::new();
        for i in 0..10 {
            g.add_edge(i, i, (i + 1) % 10, None).unwrap();
            g.add_edge(100 + i, i, (i + 3) % 10, None).unwrap();
        }
        g.add_edge(200, 4, 4, None).unwrap();

        for order in [
            g.bfs_directed([0]).collect::<Vec<_>>(),
            g.bfs_undirected([0]).collect::<Vec<_>>(),
            g.dfs_directed([0]).collect::<Vec<_>>(),
            g.dfs_undirected([0]).collect::<Vec<_>>(),
        ] {
            assert_eq!(order.len(), 10);
            assert_eq!(order.iter().collect::<HashSet<_>>().len(), 10);
        }
    }

    #[test]
    fn test_unknown_root_is_isolated() {
        let g = create_test_graph();
        let order: Vec<&str> = g.bfs_undirected(["zzz"]).collect();
        assert_eq!(order, vec!["zzz"]);

        let order: Vec<&str> = g.dfs_directed(["zzz", "f"]).collect();
        assert_eq!(as_set(&order), as_set(&["zzz", "f"]));
    }

    #[test]
    fn test_multiple_and_duplicate_roots() {
        let g = create_test_graph();
        let order: Vec<&str> = g.bfs_directed(["b", "c", "b"]).collect();

        assert_eq!(order.len(), 4);
        assert_eq!(as_set(&order[..2]), as_set(&["b", "c"]));
        assert_eq!(as_set(&order[2..]), as_set(&["e", "f"]));
    }

    #[test]
    fn test_no_roots() {
        let g = create_test_graph();
        assert_eq!(g.bfs_undirected(Vec::new()).count(), 0);
    }

    #[test]
    fn test_lazy_pull_and_colors() {
        let g = create_test_graph();
        let mut bfs = g.bfs_directed(["a"]);
        assert_eq!(bfs.color(&"a"), Color::Gray);
        assert_eq!(bfs.num_pending(), 1);

        assert_eq!(bfs.next(), Some("a"));
        assert_eq!(bfs.color(&"a"), Color::Black);
        // Expansion of "a" waits for the next pull
        assert_eq!(bfs.color(&"b"), Color::White);
        assert_eq!(bfs.num_pending(), 0);
        assert_eq!(bfs.num_visited(), 1);

        let second = bfs.next().unwrap();
        assert!(["b", "c", "d"].contains(&second));
        assert_eq!(bfs.color(&second), Color::Black);
        assert_eq!(bfs.num_pending(), 2);
        assert_eq!(bfs.color(&"e"), Color::White);

        let rest: Vec<&str> = bfs.by_ref().collect();
        assert_eq!(rest.len(), 5);
        assert_eq!(bfs.next(), None);
        assert_eq!(bfs.next(), None);
        assert_eq!(bfs.num_visited(), 7);
    }

    #[test]
    fn test_interleaved_traversals_are_independent() {
        let g = create_test_graph();
        let mut first = g.dfs_undirected(["a"]);
        let mut second = g.dfs_undirected(["a"]);

        assert_eq!(first.next(), Some("a"));
        let mut seen_first = HashSet::from(["a"]);
        let mut seen_second = HashSet::new();
        loop {
            let a = second.next();
            let b = first.next();
            if a.is_none() && b.is_none() {
                break;
            }
            seen_second.extend(a);
            seen_first.extend(b);
        }

        assert_eq!(seen_first.len(), 7);
        assert_eq!(seen_second.len(), 7);
    }

    #[test]
    fn test_new_traversal_starts_fresh() {
        let g = create_test_graph();
        let first: Vec<&str> = g.bfs_undirected(["d"]).collect();
        let second: Vec<&str> = g.bfs_undirected(["d"]).collect();
        assert_eq!(first.len(), 7);
        assert_eq!(second.len(), 7);
    }

    #[test]
    fn test_expansion_serde() {
        let json = serde_json::to_string(&Expansion::Directed).unwrap();
        assert_eq!(json, "\"directed\"");
        let parsed: Expansion = serde_json::from_str("\"undirected\"").unwrap();
        assert_eq!(parsed, Expansion::Undirected);
    }
}
