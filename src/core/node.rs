//! Scene graph node identity.
//!
//! A node is a place an object can occupy. Two nodes are reserved and always
//! present in a scene graph: [`Node::Human`] (held by the camera wearer) and
//! [`Node::FreeSpace`] (location unknown or not resolvable to a fixture).
//! Every other node is a fixture resolved from a tracking mask.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used for the held-objects node in serialised graphs.
pub const HUMAN: &str = "Human";

/// Name used for the default node in serialised graphs.
pub const FREE_SPACE: &str = "Free Space";

/// A location in the scene graph.
///
/// Serialises as a plain string so that a graph maps cleanly onto a JSON
/// object (`{"Human": [...], "Free Space": [...], "P01_counter.003": [...]}`).
///
/// Ordering puts `Human` first, then `Free Space`, then fixtures sorted by
/// key, which is the order used whenever a graph is rendered.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::core::Node;
///
/// let node = Node::from("P01_counter.003".to_string());
/// assert_eq!(node, Node::Fixture("P01_counter.003".to_string()));
/// assert_eq!(node.display_name(), "counter.003");
/// assert_eq!(Node::from("Human".to_string()), Node::Human);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Node {
    Human,
    FreeSpace,
    Fixture(String),
}

impl Node {
    /// Build a node for a resolved fixture key, falling back to
    /// [`Node::FreeSpace`] when nothing was resolved.
    pub fn from_fixture(fixture: Option<String>) -> Self {
        match fixture {
            Some(key) if !key.is_empty() => Node::from(key),
            _ => Node::FreeSpace,
        }
    }

    /// Key under which this node is stored and serialised.
    pub fn key(&self) -> &str {
        match self {
            Node::Human => HUMAN,
            Node::FreeSpace => FREE_SPACE,
            Node::Fixture(key) => key,
        }
    }

    /// Human-readable name with any video or participant scoped prefix
    /// removed (`P01_counter.003` becomes `counter.003`).
    pub fn display_name(&self) -> &str {
        match self {
            Node::Fixture(key) => key.split_once('_').map_or(key.as_str(), |(_, rest)| rest),
            other => other.key(),
        }
    }

    /// Whether this is one of the two reserved pseudo-locations.
    pub fn is_reserved(&self) -> bool {
        matches!(self, Node::Human | Node::FreeSpace)
    }
}

impl From<String> for Node {
    fn from(key: String) -> Self {
        match key.as_str() {
            HUMAN => Node::Human,
            FREE_SPACE => Node::FreeSpace,
            _ => Node::Fixture(key),
        }
    }
}

impl From<Node> for String {
    fn from(node: Node) -> Self {
        match node {
            Node::Human => HUMAN.to_string(),
            Node::FreeSpace => FREE_SPACE.to_string(),
            Node::Fixture(key) => key,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_parse_to_reserved_nodes() {
        assert_eq!(Node::from("Human".to_string()), Node::Human);
        assert_eq!(Node::from("Free Space".to_string()), Node::FreeSpace);
        assert!(Node::Human.is_reserved());
        assert!(!Node::Fixture("sink".to_string()).is_reserved());
    }

    #[test]
    fn missing_fixture_falls_back_to_free_space() {
        assert_eq!(Node::from_fixture(None), Node::FreeSpace);
        assert_eq!(Node::from_fixture(Some(String::new())), Node::FreeSpace);
        assert_eq!(
            Node::from_fixture(Some("P02_hob.001".to_string())),
            Node::Fixture("P02_hob.001".to_string())
        );
    }

    #[test]
    fn display_name_strips_scope_prefix() {
        let node = Node::Fixture("P01_counter.003".to_string());
        assert_eq!(node.display_name(), "counter.003");
        assert_eq!(node.key(), "P01_counter.003");

        let bare = Node::Fixture("sink".to_string());
        assert_eq!(bare.display_name(), "sink");
        assert_eq!(Node::FreeSpace.display_name(), "Free Space");
    }

    #[test]
    fn reserved_nodes_sort_before_fixtures() {
        let mut nodes = vec![
            Node::Fixture("a_drawer".to_string()),
            Node::FreeSpace,
            Node::Fixture("P01_counter".to_string()),
            Node::Human,
        ];
        nodes.sort();
        assert_eq!(nodes[0], Node::Human);
        assert_eq!(nodes[1], Node::FreeSpace);
        assert_eq!(nodes[2], Node::Fixture("P01_counter".to_string()));
    }

    #[test]
    fn node_serializes_as_plain_string() {
        let json = serde_json::to_string(&Node::FreeSpace).unwrap();
        assert_eq!(json, "\"Free Space\"");

        let node: Node = serde_json::from_str("\"P01_sink.001\"").unwrap();
        assert_eq!(node, Node::Fixture("P01_sink.001".to_string()));
    }
}
