//! Purpose: Forward iteration over the children of an array or object node.
//! Exports: `Children`.
//! Role: Cursor (`begin`/`end`/`advance`/`get`) and `Iterator` over one sibling chain.
//! Invariants: Every exhausted cursor equals the end sentinel, whatever it walked.
//! Invariants: Positions compare by tree identity plus node id; erasing keeps both.
use std::fmt;
use std::iter::FusedIterator;

use crate::core::arena::Arena;
use crate::core::node::Node;
use crate::core::tree::{NodeId, Tree};

/// Position in a sibling chain, or the end sentinel.
///
/// Usable both as a cursor (`begin`/`end`/`advance`/`get`/`==`) and as a
/// plain `Iterator` yielding node handles in document order.
pub struct Children<'a, T: Tree + ?Sized = Arena> {
    tree: Option<&'a T>,
    pos: Option<NodeId>,
}

impl<'a, T: Tree + ?Sized> Children<'a, T> {
    /// Positioned on the first child of `node`; the end sentinel when there is none.
    pub fn begin(node: Node<'a, T>) -> Self {
        let first = node
            .tree()
            .zip(node.id())
            .and_then(|(tree, id)| tree.first_child(id).map(|first| (tree, first)));
        match first {
            Some((tree, first)) => Self {
                tree: Some(tree),
                pos: Some(first),
            },
            None => Self::end(),
        }
    }

    /// The end sentinel. Built without looking at any node.
    pub fn end() -> Self {
        Self {
            tree: None,
            pos: None,
        }
    }

    pub fn is_end(&self) -> bool {
        self.pos.is_none()
    }

    /// Handle on the current position; absent at the end sentinel.
    pub fn get(&self) -> Node<'a, T> {
        match (self.tree, self.pos) {
            (Some(tree), Some(pos)) => Node::new(tree, pos),
            _ => Node::absent(),
        }
    }

    /// Moves to the next sibling.
    ///
    /// Advancing the end sentinel is a caller bug; debug builds panic, release
    /// builds leave the sentinel where it is.
    pub fn advance(&mut self) {
        debug_assert!(self.pos.is_some(), "advanced a child iterator past its end");
        if let (Some(tree), Some(pos)) = (self.tree, self.pos) {
            self.pos = tree.next_sibling(pos);
            if self.pos.is_none() {
                self.tree = None;
            }
        }
    }
}

impl<'a, T: Tree + 'a> Children<'a, T> {
    /// Same position, viewed through `dyn Tree`. There is no way back.
    pub fn erase(self) -> Children<'a, dyn Tree + 'a> {
        Children {
            tree: self.tree.map(|tree| tree as &'a (dyn Tree + 'a)),
            pos: self.pos,
        }
    }
}

impl<'a, T: Tree + ?Sized> Iterator for Children<'a, T> {
    type Item = Node<'a, T>;

    fn next(&mut self) -> Option<Node<'a, T>> {
        if self.pos.is_none() {
            return None;
        }
        let current = self.get();
        self.advance();
        Some(current)
    }
}

impl<T: Tree + ?Sized> FusedIterator for Children<'_, T> {}

impl<T: Tree + ?Sized> Clone for Children<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Tree + ?Sized> Copy for Children<'_, T> {}

impl<T: Tree + ?Sized> PartialEq for Children<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        match ((self.tree, self.pos), (other.tree, other.pos)) {
            ((_, None), (_, None)) => true,
            ((Some(a), Some(a_pos)), (Some(b), Some(b_pos))) => {
                std::ptr::addr_eq(a, b) && a_pos == b_pos
            }
            _ => false,
        }
    }
}

impl<T: Tree + ?Sized> Eq for Children<'_, T> {}

impl<T: Tree + ?Sized> fmt::Debug for Children<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => f.debug_tuple("Children").field(&pos).finish(),
            None => f.write_str("Children(end)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Children;
    use crate::core::arena::Arena;
    use crate::core::node::Node;
    use crate::core::tree::Parser;
    use crate::json::parse::JsonParser;

    fn tree(text: &str) -> Arena {
        JsonParser::new().parse_text(text).expect("parse")
    }

    #[test]
    fn empty_container_begins_at_end() {
        let arena = tree(r#"{"empty-list":[],"empty-obj":{}}"#);
        let root = Node::root(&arena);
        for key in ["empty-list", "empty-obj"] {
            let node = root.get(key);
            assert_eq!(node.begin(), node.end());
            assert_eq!(node.children().count(), 0);
        }
    }

    #[test]
    fn scalars_and_absent_have_no_children() {
        let arena = tree(r#"{"n":1}"#);
        let root = Node::root(&arena);
        assert!(root.get("n").begin().is_end());
        assert!(root.get("missing").begin().is_end());
    }

    #[test]
    fn cursor_walks_in_document_order() {
        let arena = tree(r#"[{"id":"1234"},{"id":"abcd"}]"#);
        let root = Node::root(&arena);
        let mut first = root.begin();
        let last = root.end();

        assert_eq!(first.get().get("id").extract::<&str>().expect("id"), "1234");
        assert_eq!(first.get(), first.get());
        first.advance();
        assert_ne!(first, last);
        assert_eq!(first.get().get("id").extract::<&str>().expect("id"), "abcd");
        first.advance();
        assert_eq!(first, last);
        assert!(first.get().is_absent());
    }

    #[test]
    fn iterator_matches_cursor() {
        let arena = tree(r#"{"a":1,"b":2,"c":3}"#);
        let root = Node::root(&arena);

        let mut manual = Vec::new();
        let mut cursor = root.begin();
        while cursor != root.end() {
            manual.push(cursor.get());
            cursor.advance();
        }
        let iterated: Vec<_> = root.children().collect();
        assert_eq!(manual, iterated);

        let keys: Vec<_> = root.into_iter().filter_map(|n| n.key()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn iterator_is_fused() {
        let arena = tree("[1]");
        let mut children = Node::root(&arena).children();
        assert!(children.next().is_some());
        assert!(children.next().is_none());
        assert!(children.next().is_none());
    }

    #[test]
    fn positions_compare_by_identity_across_trees() {
        let left = tree("[1]");
        let right = tree("[1]");
        let a = Node::root(&left).begin();
        let b = Node::root(&right).begin();
        assert_eq!(a.get().id(), b.get().id());
        assert_ne!(a, b);
        assert_eq!(Children::<Arena>::end(), Node::root(&right).end());
    }

    #[test]
    fn erased_cursor_keeps_position() {
        let arena = tree("[1,2]");
        let mut typed = Node::root(&arena).begin();
        typed.advance();
        let erased = typed.erase();
        assert_eq!(erased.get().extract::<i32>().expect("int"), 2);
        assert_eq!(erased.get().id(), typed.get().id());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "past its end")]
    fn advancing_end_panics_in_debug() {
        let mut end = Children::<Arena>::end();
        end.advance();
    }
}
