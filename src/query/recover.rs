//! Pre-action state recovery.
//!
//! Every snapshot is the state *after* its event. Consumers describing an
//! action need the state the camera wearer saw *before* acting; this is
//! obtained by inverting the transition rather than replaying from scratch.

use crate::core::{Action, GraphError, Node, SceneGraph};
use std::collections::BTreeSet;

/// Recover the graph as it was immediately before `action` on `object`.
///
/// `node` is the node the transition touched: where the object was picked
/// from, or where it was dropped. `INITIAL` has nothing to invert and
/// returns the snapshot unchanged.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::core::{Action, Node, SceneGraph};
/// use scenegraph_usage::query::recover_before;
///
/// let counter = Node::Fixture("P01_counter.003".to_string());
/// let after_pick = SceneGraph::new().with_object(Node::Human, "kettle");
///
/// let before = recover_before(&after_pick, Action::Pick, "kettle", &counter).unwrap();
/// assert!(before.contains(&counter, "kettle"));
/// assert!(!before.contains(&Node::Human, "kettle"));
/// ```
pub fn recover_before(
    after: &SceneGraph,
    action: Action,
    object: &str,
    node: &Node,
) -> Result<SceneGraph, GraphError> {
    match action {
        Action::Pick => after.moved(object, &Node::Human, node),
        Action::Drop => after.moved(object, node, &Node::Human),
        Action::Initial => Ok(after.clone()),
    }
}

/// Context around one action: what else was held and what else sat at the
/// touched node, both immediately before the action and excluding the
/// acted-on object itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionContext {
    pub objects_in_hand: BTreeSet<String>,
    pub nearby_objects: BTreeSet<String>,
}

impl ActionContext {
    /// Derive the context from a pre-action graph.
    pub fn from_before(before: &SceneGraph, object: &str, node: &Node) -> Self {
        let others = |set: Option<&BTreeSet<String>>| -> BTreeSet<String> {
            set.map(|set| set.iter().filter(|o| o.as_str() != object).cloned().collect())
                .unwrap_or_default()
        };
        Self {
            objects_in_hand: others(Some(before.held())),
            nearby_objects: others(before.objects_at(node)),
        }
    }
}
