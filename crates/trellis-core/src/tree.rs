//! Rooted ordered tree with graph export
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Subtrees move
//! between trees by value, so a node can never end up with two parents or
//! inside its own descendants.

use crate::error::{Error, Result};
use crate::graph::Graph;
use std::collections::HashMap;
use std::fmt;

/// Handle to a node within one [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A tree with one root and ordered children under every node
#[derive(Debug, Clone)]
pub struct Tree<T> {
    /// Removed nodes leave a `None` slot and ids are never reused, so the
    /// arena grows with every insertion and is never compacted.
    nodes: Vec<Option<Node<T>>>,
    root: NodeId,
    len: usize,
}

impl<T> Tree<T> {
    /// Create a tree holding only a root.
    pub fn new(value: T) -> Self {
        Self {
            nodes: vec![Some(Node {
                value,
                parent: None,
                children: Vec::new(),
            })],
            root: NodeId(0),
            len: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    fn node(&self, id: NodeId) -> Result<&Node<T>> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownNode(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<T>> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownNode(id.0))
    }

    pub fn value(&self, id: NodeId) -> Result<&T> {
        Ok(&self.node(id)?.value)
    }

    pub fn value_mut(&mut self, id: NodeId) -> Result<&mut T> {
        Ok(&mut self.node_mut(id)?.value)
    }

    /// Replace a node's value, returning the old one.
    pub fn set_value(&mut self, id: NodeId, value: T) -> Result<T> {
        Ok(std::mem::replace(&mut self.node_mut(id)?.value, value))
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn num_children(&self, id: NodeId) -> Result<usize> {
        Ok(self.node(id)?.children.len())
    }

    /// Number of edges between a node and the root.
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        let mut depth = 0;
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            current = self.node(parent)?;
            depth += 1;
        }
        Ok(depth)
    }

    /// Position of a node among its parent's children.
    pub fn child_index(&self, id: NodeId) -> Result<usize> {
        let parent = self.node(id)?.parent.ok_or(Error::TreeRoot)?;
        let position = self.node(parent)?.children.iter().position(|c| *c == id);
        debug_assert!(position.is_some(), "tree structure is corrupt");
        Ok(position.unwrap_or_default())
    }

    /// Append a new leaf under `parent`.
    pub fn add_child(&mut self, parent: NodeId, value: T) -> Result<NodeId> {
        self.node(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            value,
            parent: Some(parent),
            children: Vec::new(),
        }));
        self.node_mut(parent)?.children.push(id);
        self.len += 1;
        Ok(id)
    }

    /// Move another tree in as the child of `parent` at `index` (clamped to
    /// the number of children). Returns the new id of the grafted root.
    pub fn insert_subtree(&mut self, parent: NodeId, index: usize, mut subtree: Tree<T>) -> Result<NodeId> {
        self.node(parent)?;
        let (grafted, moved) = transplant(&mut subtree.nodes, subtree.root, &mut self.nodes, Some(parent));
        self.len += moved;

        let siblings = &mut self.node_mut(parent)?.children;
        siblings.insert(index.min(siblings.len()), grafted);
        Ok(grafted)
    }

    /// Detach the subtree rooted at `id` and return it as its own tree.
    ///
    /// The vacated slots stay in this tree's arena; their ids are retired.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Tree<T>> {
        let parent = self.node(id)?.parent.ok_or(Error::TreeRoot)?;
        let position = self.child_index(id)?;
        self.node_mut(parent)?.children.remove(position);

        let mut nodes = Vec::new();
        let (root, moved) = transplant(&mut self.nodes, id, &mut nodes, None);
        self.len -= moved;

        Ok(Tree {
            nodes,
            root,
            len: moved,
        })
    }

    /// Drop every node except the root.
    pub fn clear(&mut self) {
        let root = self.nodes.get_mut(self.root.0).and_then(Option::take);
        debug_assert!(root.is_some(), "tree lost its root");
        if let Some(root) = root {
            self.nodes = vec![Some(Node {
                value: root.value,
                parent: None,
                children: Vec::new(),
            })];
            self.root = NodeId(0);
            self.len = 1;
        }
    }

    fn walk(&self, from: NodeId) -> Walk<'_, T> {
        Walk {
            tree: self,
            stack: vec![(from, 0)],
        }
    }

    /// Node ids in pre-order, starting at the root.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.walk(self.root).map(|(id, _, _)| id)
    }

    /// Values and depths in pre-order, starting at the root.
    pub fn preorder_value_depth(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.walk(self.root).map(|(_, node, depth)| (&node.value, depth))
    }

    /// Build a graph whose vertices are the nodes, keyed by pre-order
    /// position, with one edge from every non-root node to its parent
    /// (keyed by the child's position).
    pub fn to_graph(&self) -> Result<Graph<usize, usize, T, ()>>
    where
        T: Clone,
    {
        let mut graph = Graph::with_capacity(self.len, self.len.saturating_sub(1));
        let mut positions: HashMap<NodeId, usize> = HashMap::with_capacity(self.len);

        for (position, (id, node, _)) in self.walk(self.root).enumerate() {
            positions.insert(id, position);
            graph.add_vertex(position, Some(node.value.clone()));
            if let Some(parent) = node.parent {
                let parent_position = positions
                    .get(&parent)
                    .copied()
                    .ok_or(Error::UnknownNode(parent.0))?;
                graph.add_edge(position, position, parent_position, None)?;
            }
        }

        tracing::debug!("Exported tree with {} nodes as a graph", self.len);
        Ok(graph)
    }
}

impl<T: fmt::Display> Tree<T> {
    /// Multiline rendering, one node per line indented by depth.
    ///
    /// Nodes deeper than `max_depth` are left out; nodes exactly at it are
    /// marked with `...`.
    pub fn outline(&self, indent: usize, max_depth: Option<usize>) -> String {
        let mut out = String::new();
        for (_, node, depth) in self.walk(self.root) {
            let pad = " ".repeat(indent * depth);
            match max_depth {
                Some(max) if depth > max => continue,
                Some(max) if depth == max => out.push_str(&format!("{}{} ...\n", pad, node.value)),
                _ => out.push_str(&format!("{}{}\n", pad, node.value)),
            }
        }
        out
    }
}

/// Compact form: `root[child[], child[grandchild[]]]`
impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut open = 0;
        for (_, node, depth) in self.walk(self.root) {
            let mut closed = false;
            while open > depth {
                f.write_str("]")?;
                open -= 1;
                closed = true;
            }
            if closed {
                f.write_str(", ")?;
            }
            write!(f, "{}[", node.value)?;
            open += 1;
        }
        for _ in 0..open {
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Pre-order walk yielding each node with its depth below the start.
struct Walk<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<(NodeId, usize)>,
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = (NodeId, &'a Node<T>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let node = self.tree.node(id).ok();
        debug_assert!(node.is_some(), "tree structure is corrupt");
        let node = node?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
        Some((id, node, depth))
    }
}

/// Move the subtree rooted at `root` out of `source` and append it to
/// `dest`, re-linking children to their new ids. The moved root gets
/// `parent` but is not added to that parent's children.
fn transplant<T>(
    source: &mut [Option<Node<T>>],
    root: NodeId,
    dest: &mut Vec<Option<Node<T>>>,
    parent: Option<NodeId>,
) -> (NodeId, usize) {
    let new_root = NodeId(dest.len());
    let mut moved = 0;
    let mut stack = vec![(root, parent)];

    while let Some((old, new_parent)) = stack.pop() {
        let node = source.get_mut(old.0).and_then(Option::take);
        debug_assert!(node.is_some(), "tree structure is corrupt");
        let Some(node) = node else { continue };

        let id = NodeId(dest.len());
        if id != new_root {
            if let Some(Some(p)) = new_parent.and_then(|p| dest.get_mut(p.0)) {
                p.children.push(id);
            }
        }
        stack.extend(node.children.iter().rev().map(|child| (*child, Some(id))));
        dest.push(Some(Node {
            value: node.value,
            parent: new_parent,
            children: Vec::new(),
        }));
        moved += 1;
    }

    (new_root, moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// a
    /// ├── b
    /// │   ├── c
    /// │   └── d
    /// └── e
    fn create_test_tree() -> (Tree<&'static str>, [NodeId; 5]) {
        let mut tree = Tree::new("a");
        let a = tree.root();
        let b = tree.add_child(a, "b").unwrap();
        let c = tree.add_child(b, "c").unwrap();
        let d = tree.add_child(b, "d").unwrap();
        let e = tree.add_child(a, "e").unwrap();
        (tree, [a, b, c, d, e])
    }

    #[test]
    fn test_structure_queries() {
        let (tree, [a, b, c, d, e]) = create_test_tree();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.parent(a).unwrap(), None);
        assert_eq!(tree.parent(d).unwrap(), Some(b));
        assert_eq!(tree.children(b).unwrap(), &[c, d]);
        assert_eq!(tree.num_children(a).unwrap(), 2);
        assert_eq!(tree.depth(a).unwrap(), 0);
        assert_eq!(tree.depth(c).unwrap(), 2);
        assert_eq!(tree.child_index(d).unwrap(), 1);
        assert_eq!(tree.child_index(e).unwrap(), 1);
        assert!(matches!(tree.child_index(a), Err(Error::TreeRoot)));
    }

    #[test]
    fn test_preorder() {
        let (tree, _) = create_test_tree();
        let values: Vec<(&str, usize)> = tree
            .preorder_value_depth()
            .map(|(value, depth)| (*value, depth))
            .collect();
        assert_eq!(
            values,
            vec![("a", 0), ("b", 1), ("c", 2), ("d", 2), ("e", 1)]
        );
    }

    #[test]
    fn test_display_and_outline() {
        let (tree, _) = create_test_tree();
        assert_eq!(tree.to_string(), "a[b[c[], d[]], e[]]");
        assert_eq!(Tree::new(1).to_string(), "1[]");

        assert_eq!(tree.outline(2, None), "a\n  b\n    c\n    d\n  e\n");
        assert_eq!(tree.outline(2, Some(1)), "a\n  b ...\n  e ...\n");
    }

    #[test]
    fn test_set_value() {
        let (mut tree, [_, b, ..]) = create_test_tree();
        assert_eq!(tree.set_value(b, "B").unwrap(), "b");
        *tree.value_mut(b).unwrap() = "BB";
        assert_eq!(*tree.value(b).unwrap(), "BB");
    }

    #[test]
    fn test_remove_and_insert_subtree() {
        let (mut tree, [a, b, c, _, e]) = create_test_tree();

        let removed = tree.remove_subtree(b).unwrap();
        assert_eq!(removed.to_string(), "b[c[], d[]]");
        assert_eq!(removed.len(), 3);
        assert_eq!(tree.to_string(), "a[e[]]");
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(c));
        assert!(matches!(tree.value(c), Err(Error::UnknownNode(_))));

        let grafted = tree.insert_subtree(e, 0, removed).unwrap();
        assert_eq!(tree.to_string(), "a[e[b[c[], d[]]]]");
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.depth(grafted).unwrap(), 2);
        assert_eq!(tree.parent(grafted).unwrap(), Some(e));

        let other = Tree::new("z");
        tree.insert_subtree(a, 0, other).unwrap();
        assert_eq!(tree.to_string(), "a[z[], e[b[c[], d[]]]]");

        assert!(matches!(tree.remove_subtree(a), Err(Error::TreeRoot)));
    }

    #[test]
    fn test_removed_ids_are_retired() {
        let (mut tree, [a, b, c, d, _]) = create_test_tree();

        let removed = tree.remove_subtree(b).unwrap();
        let fresh = tree.add_child(a, "f").unwrap();
        for retired in [b, c, d] {
            assert_ne!(fresh, retired);
            assert!(!tree.contains(retired));
        }

        let grafted = tree.insert_subtree(a, 0, removed).unwrap();
        assert!(![b, c, d, fresh].contains(&grafted));
        assert!(grafted.index() > fresh.index());
        assert_eq!(tree.to_string(), "a[b[c[], d[]], e[], f[]]");
    }

    #[test]
    fn test_clear_and_copy() {
        let (tree, _) = create_test_tree();
        let mut copy = tree.clone();
        copy.clear();

        assert_eq!(copy.to_string(), "a[]");
        assert_eq!(copy.len(), 1);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.to_string(), "a[b[c[], d[]], e[]]");
    }

    #[test]
    fn test_to_graph() {
        let (tree, _) = create_test_tree();
        let graph = tree.to_graph().unwrap();

        assert_eq!(graph.num_vertices(), 5);
        assert_eq!(graph.num_edges(), 4);
        assert!(graph.check_consistency().is_ok());

        // Pre-order positions: a=0, b=1, c=2, d=3, e=4
        assert_eq!(graph.get_vertex(&0), Some(&Some("a")));
        assert_eq!(graph.get_vertex(&3), Some(&Some("d")));
        for (child, parent) in [(1, 0), (2, 1), (3, 1), (4, 0)] {
            assert_eq!(graph.get_source(&child), Some(&child));
            assert_eq!(graph.get_target(&child), Some(&parent));
        }
        assert!(!graph.is_edge(&0));

        // Directed traversal from a leaf walks up to the root
        let path: Vec<usize> = graph.dfs_directed([3]).collect();
        assert_eq!(path, vec![3, 1, 0]);

        let everything: HashSet<usize> = graph.bfs_undirected([3]).collect();
        assert_eq!(everything.len(), 5);
    }

    #[test]
    fn test_to_graph_after_surgery() {
        let (mut tree, [_, b, ..]) = create_test_tree();
        tree.remove_subtree(b).unwrap();

        let graph = tree.to_graph().unwrap();
        assert_eq!(graph.num_vertices(), 2);
        assert_eq!(graph.get_vertex(&1), Some(&Some("e")));
        assert_eq!(graph.get_target(&1), Some(&0));
    }
}
