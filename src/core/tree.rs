//! Purpose: Define the contract between handles and whatever owns parsed nodes.
//! Exports: `NodeKind`, `NodeId`, `Tree`, `Parser`.
//! Role: Collaborator seam; handles and iterators only ever talk to `dyn Tree`-safe methods.
//! Invariants: `Tree` stays object-safe so any tree can be viewed as `dyn Tree`.
//! Invariants: A tree is immutable once built; releasing it is its `Drop`.
//! Invariants: Children form a singly linked chain reachable from `first_child`.
use serde_json::Number;

use crate::core::error::Error;

/// Discriminant of a parsed node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Null,
    True,
    False,
    Number,
    String,
    Array,
    Object,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::True => "true",
            NodeKind::False => "false",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Array | NodeKind::Object)
    }
}

/// Position of one node inside a single tree.
///
/// Ids are only meaningful together with the tree that issued them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read access to a parsed node tree.
///
/// Lookups on the wrong kind return `None` rather than failing. The
/// container helpers have default implementations that walk the sibling
/// chain; trees with better indexes can override them.
pub trait Tree {
    fn root(&self) -> Option<NodeId>;

    /// Whether `node` was issued by this tree.
    fn contains(&self, node: NodeId) -> bool;

    fn kind(&self, node: NodeId) -> NodeKind;

    fn number(&self, node: NodeId) -> Option<&Number>;

    fn string(&self, node: NodeId) -> Option<&str>;

    /// Key of `node` when it is a member of an object.
    fn key(&self, node: NodeId) -> Option<&str>;

    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    fn child_count(&self, node: NodeId) -> usize {
        if !self.kind(node).is_container() {
            return 0;
        }
        let mut count = 0;
        let mut cur = self.first_child(node);
        while let Some(child) = cur {
            count += 1;
            cur = self.next_sibling(child);
        }
        count
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        if self.kind(node) != NodeKind::Array {
            return None;
        }
        let mut cur = self.first_child(node);
        for _ in 0..index {
            cur = self.next_sibling(cur?);
        }
        cur
    }

    fn child_by_key(&self, node: NodeId, key: &str) -> Option<NodeId> {
        if self.kind(node) != NodeKind::Object {
            return None;
        }
        let mut cur = self.first_child(node);
        while let Some(child) = cur {
            if self.key(child) == Some(key) {
                return Some(child);
            }
            cur = self.next_sibling(child);
        }
        None
    }
}

/// Turns text into a tree.
pub trait Parser {
    type Tree: Tree;

    fn parse_text(&self, text: &str) -> Result<Self::Tree, Error>;
}

#[cfg(test)]
mod tests {
    use super::{NodeId, NodeKind, Tree};
    use serde_json::Number;

    // [10, 20, 30] with hand-written links; only the required methods.
    struct Fixed;

    impl Tree for Fixed {
        fn root(&self) -> Option<NodeId> {
            Some(NodeId::new(0))
        }

        fn contains(&self, node: NodeId) -> bool {
            node.index() <= 3
        }

        fn kind(&self, node: NodeId) -> NodeKind {
            if node.index() == 0 {
                NodeKind::Array
            } else {
                NodeKind::Number
            }
        }

        fn number(&self, _node: NodeId) -> Option<&Number> {
            None
        }

        fn string(&self, _node: NodeId) -> Option<&str> {
            None
        }

        fn key(&self, _node: NodeId) -> Option<&str> {
            None
        }

        fn first_child(&self, node: NodeId) -> Option<NodeId> {
            (node.index() == 0).then(|| NodeId::new(1))
        }

        fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
            match node.index() {
                1 | 2 => Some(NodeId::new(node.index() as u32 + 1)),
                _ => None,
            }
        }
    }

    #[test]
    fn default_walkers_follow_sibling_chain() {
        let root = NodeId::new(0);
        assert_eq!(Fixed.child_count(root), 3);
        assert_eq!(Fixed.child_at(root, 2), Some(NodeId::new(3)));
        assert_eq!(Fixed.child_at(root, 3), None);
        assert_eq!(Fixed.child_by_key(root, "x"), None);
        assert_eq!(Fixed.child_count(NodeId::new(1)), 0);
    }

    #[test]
    fn tree_is_object_safe() {
        let tree: &dyn Tree = &Fixed;
        assert_eq!(tree.kind(NodeId::new(2)), NodeKind::Number);
    }
}
