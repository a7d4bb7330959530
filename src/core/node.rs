//! Purpose: Non-owning, copyable handle to one node of a parsed tree.
//! Exports: `Node`, `Index`.
//! Role: Lookup, truthiness, and the entry point for typed extraction.
//! Invariants: Lookups never fail; mismatched kinds and misses yield an absent handle.
//! Invariants: Equality is identity (same tree, same position), never structural.
//! Invariants: A handle borrows its tree, so it cannot outlive the owning document.
use std::fmt;

use crate::core::arena::Arena;
use crate::core::error::{Error, ErrorKind};
use crate::core::extract::FromNode;
use crate::core::iter::Children;
use crate::core::tree::{NodeId, NodeKind, Tree};

/// A lightweight reference to a node, or to nothing.
///
/// ```
/// use jsonview::api::parse;
///
/// let doc = parse(r#"{"code":0,"list":[{"id":"1234"}]}"#);
/// assert_eq!(doc.get("code").extract::<i32>().unwrap(), 0);
/// assert_eq!(doc.get("list").get(0).get("id").extract_opt::<&str>(), Some("1234"));
/// assert!(!doc.get("missing").get(3).truthy());
/// ```
///
/// Handles borrow the document, so the borrow checker rejects keeping one
/// past the document's release:
///
/// ```compile_fail
/// use jsonview::api::parse;
///
/// let node = {
///     let doc = parse(r#"{"a":1}"#);
///     doc.get("a")
/// };
/// assert!(node.truthy());
/// ```
pub struct Node<'a, T: Tree + ?Sized = Arena> {
    at: Option<(&'a T, NodeId)>,
}

impl<'a, T: Tree + ?Sized> Node<'a, T> {
    /// Handle on `id`; absent when `tree` did not issue that id.
    pub fn new(tree: &'a T, id: NodeId) -> Self {
        Self {
            at: tree.contains(id).then_some((tree, id)),
        }
    }

    pub fn absent() -> Self {
        Self { at: None }
    }

    /// Handle on the root of `tree`; absent when the tree is empty.
    pub fn root(tree: &'a T) -> Self {
        Self {
            at: tree.root().map(|id| (tree, id)),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.at.is_none()
    }

    /// Position of the node inside its tree.
    pub fn id(&self) -> Option<NodeId> {
        self.at.map(|(_, id)| id)
    }

    pub fn tree(&self) -> Option<&'a T> {
        self.at.map(|(tree, _)| tree)
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.at.map(|(tree, id)| tree.kind(id))
    }

    /// False for absent handles, `null` and `false`; true otherwise.
    pub fn truthy(&self) -> bool {
        !matches!(
            self.kind(),
            None | Some(NodeKind::Null) | Some(NodeKind::False)
        )
    }

    /// Number of direct children; 0 for scalars and absent handles.
    pub fn size(&self) -> usize {
        match self.at {
            Some((tree, id)) => tree.child_count(id),
            None => 0,
        }
    }

    /// Looks up an array element (`usize`) or an object member (`&str`).
    pub fn get<I: Index>(&self, index: I) -> Node<'a, T> {
        match self.at {
            Some((tree, id)) => match index.index_into(tree, id) {
                Some(child) => Node::new(tree, child),
                None => Node::absent(),
            },
            None => Node::absent(),
        }
    }

    /// Key of this node when it is an object member.
    pub fn key(&self) -> Option<&'a str> {
        let (tree, id) = self.at?;
        tree.key(id)
    }

    /// The following element or member of the same container.
    pub fn next_sibling(&self) -> Node<'a, T> {
        match self.at.and_then(|(tree, id)| tree.next_sibling(id).map(|next| (tree, next))) {
            Some((tree, next)) => Node::new(tree, next),
            None => Node::absent(),
        }
    }

    pub fn extract_opt<V: FromNode<'a>>(&self) -> Option<V> {
        V::from_node(*self)
    }

    pub fn extract_or<V: FromNode<'a>>(&self, fallback: V) -> V {
        self.extract_opt().unwrap_or(fallback)
    }

    /// Strict extraction.
    ///
    /// Fails with `ErrorKind::Absent` when the handle points nowhere and with
    /// `ErrorKind::TypeMismatch` when the node cannot become a `V`.
    pub fn extract<V: FromNode<'a>>(&self) -> Result<V, Error> {
        if let Some(value) = self.extract_opt() {
            return Ok(value);
        }
        let target = std::any::type_name::<V>();
        Err(match self.kind() {
            None => Error::new(ErrorKind::Absent)
                .with_message(format!("no node to extract {target} from")),
            Some(kind) => Error::new(ErrorKind::TypeMismatch)
                .with_message(format!("cannot extract {target} from {}", kind.as_str())),
        })
    }

    pub fn children(&self) -> Children<'a, T> {
        Children::begin(*self)
    }

    pub fn begin(&self) -> Children<'a, T> {
        Children::begin(*self)
    }

    pub fn end(&self) -> Children<'a, T> {
        Children::end()
    }
}

impl<'a, T: Tree + 'a> Node<'a, T> {
    /// Views the same node through `dyn Tree`.
    pub fn erase(self) -> Node<'a, dyn Tree + 'a> {
        Node {
            at: self.at.map(|(tree, id)| (tree as &'a (dyn Tree + 'a), id)),
        }
    }
}

impl<T: Tree + ?Sized> Clone for Node<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Tree + ?Sized> Copy for Node<'_, T> {}

impl<T: Tree + ?Sized> PartialEq for Node<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.at, other.at) {
            (Some((a, a_id)), Some((b, b_id))) => std::ptr::addr_eq(a, b) && a_id == b_id,
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Tree + ?Sized> Eq for Node<'_, T> {}

impl<T: Tree + ?Sized> fmt::Debug for Node<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.at {
            Some((tree, id)) => f
                .debug_struct("Node")
                .field("id", &id)
                .field("kind", &tree.kind(id))
                .field("key", &tree.key(id))
                .finish(),
            None => f.write_str("Node(absent)"),
        }
    }
}

impl<'a, T: Tree + ?Sized> IntoIterator for Node<'a, T> {
    type Item = Node<'a, T>;
    type IntoIter = Children<'a, T>;

    fn into_iter(self) -> Children<'a, T> {
        self.children()
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl<T: ?Sized + Sealed> Sealed for &T {}
}

/// Selects index lookup (`usize`, arrays) or key lookup (strings, objects).
pub trait Index: private::Sealed {
    #[doc(hidden)]
    fn index_into<T: Tree + ?Sized>(&self, tree: &T, node: NodeId) -> Option<NodeId>;
}

impl Index for usize {
    fn index_into<T: Tree + ?Sized>(&self, tree: &T, node: NodeId) -> Option<NodeId> {
        tree.child_at(node, *self)
    }
}

impl Index for str {
    fn index_into<T: Tree + ?Sized>(&self, tree: &T, node: NodeId) -> Option<NodeId> {
        tree.child_by_key(node, self)
    }
}

impl Index for String {
    fn index_into<T: Tree + ?Sized>(&self, tree: &T, node: NodeId) -> Option<NodeId> {
        tree.child_by_key(node, self)
    }
}

impl<I: Index + ?Sized> Index for &I {
    fn index_into<T: Tree + ?Sized>(&self, tree: &T, node: NodeId) -> Option<NodeId> {
        (**self).index_into(tree, node)
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use crate::core::arena::Arena;
    use crate::core::error::ErrorKind;
    use crate::core::tree::{NodeId, NodeKind, Parser};
    use crate::json::parse::JsonParser;

    fn tree(text: &str) -> Arena {
        JsonParser::new().parse_text(text).expect("parse")
    }

    #[test]
    fn lookup_on_wrong_kind_is_absent() {
        let arena = tree(r#"{"obj":{"a":1},"arr":[1,2]}"#);
        let root = Node::root(&arena);
        assert!(root.get(0).is_absent());
        assert!(root.get("arr").get("a").is_absent());
        assert!(root.get("obj").get(0).is_absent());
        assert!(root.get("arr").get(2).is_absent());
        assert_eq!(root.get("arr").get(1).extract_opt::<i64>(), Some(2));
    }

    #[test]
    fn absent_handles_absorb_lookups() {
        let absent: Node<'_> = Node::absent();
        assert!(absent.get("x").get(0).is_absent());
        assert_eq!(absent.size(), 0);
        assert_eq!(absent.kind(), None);
        assert_eq!(absent.key(), None);
        assert!(absent.next_sibling().is_absent());
    }

    #[test]
    fn truthiness_follows_kind() {
        let arena = tree(r#"[null,false,true,0,"",[],{}]"#);
        let root = Node::root(&arena);
        let truthy: Vec<bool> = root.children().map(|n| n.truthy()).collect();
        assert_eq!(truthy, [false, false, true, true, true, true, true]);
        assert!(!Node::<Arena>::absent().truthy());
    }

    #[test]
    fn size_counts_direct_children_only() {
        let arena = tree(r#"{"a":[1,[2,3]],"b":"text"}"#);
        let root = Node::root(&arena);
        assert_eq!(root.size(), 2);
        assert_eq!(root.get("a").size(), 2);
        assert_eq!(root.get("b").size(), 0);
    }

    #[test]
    fn key_lookup_accepts_owned_and_borrowed() {
        let arena = tree(r#"{"name":"x"}"#);
        let root = Node::root(&arena);
        let owned = String::from("name");
        assert_eq!(root.get(&owned), root.get("name"));
        assert_eq!(root.get(owned).key(), Some("name"));
    }

    #[test]
    fn strict_extraction_distinguishes_causes() {
        let arena = tree(r#"{"message":"OK"}"#);
        let root = Node::root(&arena);

        let err = root.get("missing").extract::<i32>().expect_err("absent");
        assert_eq!(err.kind(), ErrorKind::Absent);

        let err = root.get("message").extract::<i32>().expect_err("mismatch");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.message().unwrap_or_default().contains("string"));

        assert_eq!(root.get("message").extract_or(-1i32), -1);
        assert_eq!(root.get("message").extract::<&str>().expect("text"), "OK");
    }

    #[test]
    fn equality_is_identity() {
        let left = tree("[1,1]");
        let right = tree("[1,1]");
        let a = Node::root(&left);
        let b = Node::root(&right);
        assert_ne!(a, b);
        assert_eq!(a, Node::root(&left));
        assert_ne!(a.get(0), a.get(1));
        assert_eq!(Node::<Arena>::absent(), Node::absent());
    }

    #[test]
    fn ids_from_another_tree_are_absent() {
        let big = tree("[1,2,3,4]");
        let small = tree("[]");
        let foreign = Node::root(&big).get(3).id().expect("id");
        let node = Node::new(&small, foreign);
        assert!(node.is_absent());
        assert!(!node.truthy());
        assert_eq!(node.size(), 0);
        assert!(Node::new(&small, NodeId::new(u32::MAX)).get(0).is_absent());
        assert_eq!(Node::new(&big, foreign).extract_opt::<i32>(), Some(4));
    }

    #[test]
    fn next_sibling_walks_members() {
        let arena = tree(r#"{"a":1,"b":2}"#);
        let a = Node::root(&arena).get("a");
        assert_eq!(a.next_sibling().key(), Some("b"));
        assert!(a.next_sibling().next_sibling().is_absent());
    }

    #[test]
    fn erased_handles_keep_identity() {
        let arena = tree(r#"{"a":[true]}"#);
        let node = Node::root(&arena).get("a");
        let erased = node.erase();
        assert_eq!(erased.kind(), Some(NodeKind::Array));
        assert_eq!(erased.id(), node.id());
        assert!(erased.get(0).extract::<bool>().expect("bool"));
    }
}
