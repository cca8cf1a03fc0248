//! Object graph access for whole-entity snapshots
//!
//! Entities expose their members as plain values or as references to other
//! graph nodes. References may form cycles (a child pointing back at its
//! parent through a `Weak`), so walkers must track node identity.

use std::rc::Rc;

use serde_json::Value;

/// Shared reference to a node in an entity graph
pub type NodeRef = Rc<dyn GraphNode>;

/// A member of a graph node
pub enum Member {
    /// Scalar or plain JSON data
    Value(Value),
    /// Reference to a single related node, if any
    Reference(Option<NodeRef>),
    /// Collection of related nodes
    Collection(Vec<NodeRef>),
}

impl Member {
    /// Shorthand for a value member
    pub fn value(value: impl Into<Value>) -> Self {
        Member::Value(value.into())
    }

    /// The plain value, if this is a value member
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Member::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// A node in an entity graph
pub trait GraphNode {
    /// Members in declaration order
    fn members(&self) -> Vec<(String, Member)>;
}

/// Identity of a node, stable for as long as the node is alive
///
/// Two handles to the same allocation (an `Rc` clone, an upgraded `Weak`, or
/// a plain borrow of the value) yield the same identity.
pub fn node_id(node: &dyn GraphNode) -> usize {
    node as *const dyn GraphNode as *const () as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Leaf(i64);

    impl GraphNode for Leaf {
        fn members(&self) -> Vec<(String, Member)> {
            vec![("Value".into(), Member::value(self.0))]
        }
    }

    #[test]
    fn test_node_identity_across_handles() {
        let leaf = Rc::new(Leaf(1));
        let as_node: NodeRef = leaf.clone();
        let weak = Rc::downgrade(&as_node);

        assert_eq!(node_id(&*leaf), node_id(&*as_node));
        assert_eq!(node_id(&*weak.upgrade().unwrap()), node_id(&*leaf));
        assert_ne!(node_id(&Leaf(1)), node_id(&*leaf));
    }

    #[test]
    fn test_member_value_accessor() {
        let members = Leaf(7).members();
        assert_eq!(members[0].1.as_value(), Some(&json!(7)));
        assert!(Member::Reference(None).as_value().is_none());
    }
}
