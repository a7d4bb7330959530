//! Purpose: Flat, sibling-linked node storage for one parsed document.
//! Exports: `Arena`.
//! Role: Default `Tree` behind `Document`; filled by the JSON decode boundary.
//! Invariants: The root, when present, is the first node pushed (`NodeId(0)`).
//! Invariants: Children are linked in document order; object keys are kept verbatim,
//! duplicates included.
//! Invariants: `len` on a container always equals the length of its sibling chain.
//! Invariants: Ids past the end read as an empty `null` node; pushes past `u32::MAX` nodes fail.
use serde_json::Number;

use crate::core::error::{Error, ErrorKind, ParseFailureCategory};
use crate::core::tree::{NodeId, NodeKind, Tree};

pub(crate) const NODE_LIMIT_MESSAGE: &str = "node limit exceeded";

#[derive(Clone, Debug, PartialEq)]
enum Payload {
    Null,
    Bool(bool),
    Number(Number),
    String(Box<str>),
    Array,
    Object,
}

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    payload: Payload,
    key: Option<Box<str>>,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    len: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arena {
    slots: Vec<Slot>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push_null(&mut self) -> Result<NodeId, Error> {
        self.push(Payload::Null)
    }

    pub fn push_bool(&mut self, value: bool) -> Result<NodeId, Error> {
        self.push(Payload::Bool(value))
    }

    pub fn push_number(&mut self, value: Number) -> Result<NodeId, Error> {
        self.push(Payload::Number(value))
    }

    pub fn push_string(&mut self, value: impl Into<Box<str>>) -> Result<NodeId, Error> {
        self.push(Payload::String(value.into()))
    }

    pub fn push_array(&mut self) -> Result<NodeId, Error> {
        self.push(Payload::Array)
    }

    pub fn push_object(&mut self) -> Result<NodeId, Error> {
        self.push(Payload::Object)
    }

    /// Appends `child` to `parent`, after `prev` (the current last child).
    ///
    /// Panics if any id was not issued by this arena.
    pub fn append_child(&mut self, parent: NodeId, prev: Option<NodeId>, child: NodeId) {
        match prev {
            Some(prev) => self.slots[prev.index()].next_sibling = Some(child),
            None => self.slots[parent.index()].first_child = Some(child),
        }
        self.slots[parent.index()].len += 1;
    }

    pub fn set_key(&mut self, node: NodeId, key: impl Into<Box<str>>) {
        self.slots[node.index()].key = Some(key.into());
    }

    fn push(&mut self, payload: Payload) -> Result<NodeId, Error> {
        let id = next_id(self.slots.len())?;
        self.slots.push(Slot {
            payload,
            key: None,
            first_child: None,
            next_sibling: None,
            len: 0,
        });
        Ok(id)
    }

    fn slot(&self, node: NodeId) -> Option<&Slot> {
        self.slots.get(node.index())
    }
}

fn next_id(len: usize) -> Result<NodeId, Error> {
    u32::try_from(len).map(NodeId::new).map_err(|_| {
        Error::new(ErrorKind::Parse)
            .with_message(format!("{NODE_LIMIT_MESSAGE}: {len} nodes"))
            .with_category(ParseFailureCategory::SizeLimit)
    })
}

impl Tree for Arena {
    fn root(&self) -> Option<NodeId> {
        (!self.slots.is_empty()).then(|| NodeId::new(0))
    }

    fn contains(&self, node: NodeId) -> bool {
        node.index() < self.slots.len()
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        let Some(slot) = self.slot(node) else {
            return NodeKind::Null;
        };
        match slot.payload {
            Payload::Null => NodeKind::Null,
            Payload::Bool(true) => NodeKind::True,
            Payload::Bool(false) => NodeKind::False,
            Payload::Number(_) => NodeKind::Number,
            Payload::String(_) => NodeKind::String,
            Payload::Array => NodeKind::Array,
            Payload::Object => NodeKind::Object,
        }
    }

    fn number(&self, node: NodeId) -> Option<&Number> {
        match &self.slot(node)?.payload {
            Payload::Number(value) => Some(value),
            _ => None,
        }
    }

    fn string(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node)?.payload {
            Payload::String(value) => Some(&**value),
            _ => None,
        }
    }

    fn key(&self, node: NodeId) -> Option<&str> {
        self.slot(node)?.key.as_deref()
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node)?.first_child
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node)?.next_sibling
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.slot(node).map_or(0, |slot| slot.len)
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, next_id};
    use crate::core::error::{ErrorKind, ParseFailureCategory};
    use crate::core::tree::{NodeId, NodeKind, Tree};
    use serde_json::Number;

    #[test]
    fn empty_arena_has_no_root() {
        assert_eq!(Arena::new().root(), None);
    }

    #[test]
    fn object_members_keep_order_and_duplicates() {
        let mut arena = Arena::new();
        let root = arena.push_object().expect("push");
        let a = arena.push_number(Number::from(1u64)).expect("push");
        arena.set_key(a, "a");
        arena.append_child(root, None, a);
        let b = arena.push_string("x").expect("push");
        arena.set_key(b, "b");
        arena.append_child(root, Some(a), b);
        let dup = arena.push_bool(false).expect("push");
        arena.set_key(dup, "a");
        arena.append_child(root, Some(b), dup);

        assert_eq!(arena.root(), Some(root));
        assert_eq!(arena.child_count(root), 3);
        assert_eq!(arena.child_by_key(root, "a"), Some(a));
        assert_eq!(arena.child_by_key(root, "b"), Some(b));
        assert_eq!(arena.next_sibling(b), Some(dup));
        assert_eq!(arena.kind(dup), NodeKind::False);
        assert_eq!(arena.string(b), Some("x"));
        assert_eq!(arena.number(b), None);
    }

    #[test]
    fn index_lookup_requires_array() {
        let mut arena = Arena::new();
        let root = arena.push_object().expect("push");
        let child = arena.push_null().expect("push");
        arena.set_key(child, "0");
        arena.append_child(root, None, child);

        assert_eq!(arena.child_at(root, 0), None);
        assert_eq!(arena.child_by_key(root, "0"), Some(child));
    }

    #[test]
    fn ids_past_the_end_read_as_empty() {
        let mut arena = Arena::new();
        let root = arena.push_array().expect("push");
        let stray = NodeId::new(7);
        assert!(arena.contains(root));
        assert!(!arena.contains(stray));
        assert_eq!(arena.kind(stray), NodeKind::Null);
        assert_eq!(arena.key(stray), None);
        assert_eq!(arena.number(stray), None);
        assert_eq!(arena.first_child(stray), None);
        assert_eq!(arena.child_count(stray), 0);
        assert_eq!(arena.child_by_key(stray, "a"), None);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn id_allocation_stops_at_u32_range() {
        assert_eq!(next_id(5).expect("small"), NodeId::new(5));
        assert_eq!(next_id(u32::MAX as usize).expect("max"), NodeId::new(u32::MAX));
        let err = next_id(u32::MAX as usize + 1).expect_err("overflow");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.category(), Some(ParseFailureCategory::SizeLimit));
    }
}
