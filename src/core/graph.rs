//! Immutable scene graph snapshots.
//!
//! A [`SceneGraph`] maps every known node to the set of object names present
//! there. Snapshots are values: moving an object returns a new graph and
//! leaves the original untouched. Node sets are reference counted, so a move
//! only copies the two sets it touches and every other node is shared with
//! the previous snapshot.

use super::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a structural graph operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("Object '{object}' is not present at node '{node}'")]
    NotPresent { object: String, node: Node },

    #[error("Object '{object}' is already present at node '{node}'")]
    AlreadyPresent { object: String, node: Node },
}

/// Mapping from node to the objects currently located there.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::core::{Node, SceneGraph};
///
/// let counter = Node::Fixture("P01_counter.003".to_string());
/// let graph = SceneGraph::new().with_object(counter.clone(), "kettle");
///
/// let held = graph.moved("kettle", &counter, &Node::Human).unwrap();
/// assert!(held.contains(&Node::Human, "kettle"));
/// assert!(graph.contains(&counter, "kettle")); // Original unchanged
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneGraph {
    nodes: BTreeMap<Node, Arc<BTreeSet<String>>>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the two reserved, empty nodes.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(Node::Human, Arc::new(BTreeSet::new()));
        nodes.insert(Node::FreeSpace, Arc::new(BTreeSet::new()));
        Self { nodes }
    }

    /// Return a graph with `object` added to `node`, creating the node if
    /// it is not known yet.
    pub fn with_object(mut self, node: Node, object: impl Into<String>) -> Self {
        self.insert(node, object.into());
        self
    }

    /// Objects at `node`, or `None` if the node has never been seen.
    pub fn objects_at(&self, node: &Node) -> Option<&BTreeSet<String>> {
        self.nodes.get(node).map(|set| set.as_ref())
    }

    /// Objects currently held.
    pub fn held(&self) -> &BTreeSet<String> {
        self.nodes
            .get(&Node::Human)
            .map(|set| set.as_ref())
            .unwrap_or(empty_set())
    }

    pub fn contains(&self, node: &Node, object: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|set| set.contains(object))
    }

    pub fn has_node(&self, node: &Node) -> bool {
        self.nodes.contains_key(node)
    }

    /// Iterate nodes in rendering order with their objects.
    pub fn iter(&self) -> impl Iterator<Item = (&Node, &BTreeSet<String>)> {
        self.nodes.iter().map(|(node, set)| (node, set.as_ref()))
    }

    /// Find the node holding `object` by scanning every node.
    ///
    /// The state machine keeps its own location table; this is for
    /// consumers holding only a snapshot.
    pub fn locate(&self, object: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|(_, set)| set.contains(object))
            .map(|(node, _)| node)
    }

    /// Total number of object placements across all nodes.
    pub fn object_count(&self) -> usize {
        self.nodes.values().map(|set| set.len()).sum()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move `object` from `from` to `to`, returning the new graph.
    ///
    /// Fails if the object is not at `from`. Moving onto the same node is a
    /// no-op that still validates membership.
    pub fn moved(&self, object: &str, from: &Node, to: &Node) -> Result<Self, GraphError> {
        if !self.contains(from, object) {
            return Err(GraphError::NotPresent {
                object: object.to_string(),
                node: from.clone(),
            });
        }
        if from == to {
            return Ok(self.clone());
        }
        if self.contains(to, object) {
            return Err(GraphError::AlreadyPresent {
                object: object.to_string(),
                node: to.clone(),
            });
        }

        let mut next = self.clone();
        next.remove(from, object);
        next.insert(to.clone(), object.to_string());
        Ok(next)
    }

    /// Whether `node` shares its object set with `other` without a copy.
    pub fn shares_storage(&self, other: &SceneGraph, node: &Node) -> bool {
        match (self.nodes.get(node), other.nodes.get(node)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Render the graph as indented `node: [objects]` lines.
    ///
    /// Nodes without objects are skipped unless `show_empty` is set. An
    /// empty rendering yields `(empty scene graph)`.
    pub fn render(&self, show_empty: bool) -> String {
        self.render_with(show_empty, |node| node.key().to_string())
    }

    pub(crate) fn render_with<F>(&self, show_empty: bool, label: F) -> String
    where
        F: Fn(&Node) -> String,
    {
        let lines: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, set)| show_empty || !set.is_empty())
            .map(|(node, set)| {
                let objects: Vec<&str> = set.iter().map(String::as_str).collect();
                format!("  {}: [{}]", label(node), objects.join(", "))
            })
            .collect();

        if lines.is_empty() {
            "  (empty scene graph)".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub(crate) fn insert(&mut self, node: Node, object: String) {
        Arc::make_mut(self.nodes.entry(node).or_default()).insert(object);
    }

    pub(crate) fn remove(&mut self, node: &Node, object: &str) -> bool {
        match self.nodes.get_mut(node) {
            Some(set) if set.contains(object) => Arc::make_mut(set).remove(object),
            _ => false,
        }
    }
}

impl fmt::Display for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

fn empty_set() -> &'static BTreeSet<String> {
    static EMPTY: BTreeSet<String> = BTreeSet::new();
    &EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Node {
        Node::Fixture("P01_counter.003".to_string())
    }

    fn sink() -> Node {
        Node::Fixture("P01_sink.001".to_string())
    }

    #[test]
    fn new_graph_has_reserved_nodes() {
        let graph = SceneGraph::new();
        assert!(graph.has_node(&Node::Human));
        assert!(graph.has_node(&Node::FreeSpace));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.object_count(), 0);
        assert!(graph.held().is_empty());
    }

    #[test]
    fn moved_does_not_mutate_original() {
        let graph = SceneGraph::new().with_object(counter(), "kettle");
        let next = graph.moved("kettle", &counter(), &Node::Human).unwrap();

        assert!(graph.contains(&counter(), "kettle"));
        assert!(!graph.contains(&Node::Human, "kettle"));
        assert!(next.contains(&Node::Human, "kettle"));
        assert!(!next.contains(&counter(), "kettle"));
    }

    #[test]
    fn moved_rejects_absent_object() {
        let graph = SceneGraph::new().with_object(counter(), "kettle");
        let result = graph.moved("kettle", &Node::Human, &sink());

        assert_eq!(
            result,
            Err(GraphError::NotPresent {
                object: "kettle".to_string(),
                node: Node::Human,
            })
        );
    }

    #[test]
    fn moved_shares_untouched_nodes() {
        let graph = SceneGraph::new()
            .with_object(counter(), "kettle")
            .with_object(sink(), "sponge");
        let next = graph.moved("kettle", &counter(), &Node::Human).unwrap();

        assert!(next.shares_storage(&graph, &sink()));
        assert!(next.shares_storage(&graph, &Node::FreeSpace));
        assert!(!next.shares_storage(&graph, &counter()));
    }

    #[test]
    fn move_to_new_fixture_grows_node_set() {
        let graph = SceneGraph::new().with_object(Node::Human, "mug2");
        let next = graph.moved("mug2", &Node::Human, &sink()).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(next.node_count(), 3);
        assert_eq!(next.locate("mug2"), Some(&sink()));
    }

    #[test]
    fn render_skips_empty_nodes_by_default() {
        let graph = SceneGraph::new()
            .with_object(counter(), "spoon")
            .with_object(counter(), "kettle");

        assert_eq!(graph.render(false), "  P01_counter.003: [kettle, spoon]");
        assert_eq!(
            graph.render(true),
            "  Human: []\n  Free Space: []\n  P01_counter.003: [kettle, spoon]"
        );
        assert_eq!(SceneGraph::new().render(false), "  (empty scene graph)");
    }

    #[test]
    fn graph_serializes_as_json_object() {
        let graph = SceneGraph::new().with_object(Node::Human, "knife");
        let json = serde_json::to_string(&graph).unwrap();
        assert_eq!(json, r#"{"Human":["knife"],"Free Space":[]}"#);

        let back: SceneGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
    }
}
