//! Purpose: Owning, shareable handle over one parsed tree.
//! Exports: `Document`.
//! Role: Lifetime anchor for every `Node` and `Children` derived from it.
//! Invariants: Clones share one tree; the tree is released exactly once, by the last clone.
//! Invariants: A failed lazy parse is a document with an absent root plus the retained error.
//! Invariants: Equality is identity of the shared allocation, never structure.
//! Notes: `Rc`-based, so a document never crosses threads.
use std::fmt;
use std::rc::Rc;

use crate::core::arena::Arena;
use crate::core::error::Error;
use crate::core::extract::FromNode;
use crate::core::iter::Children;
use crate::core::node::{Index, Node};
use crate::core::tree::{NodeKind, Parser, Tree};
use crate::json::parse::JsonParser;

/// Shared ownership of a parsed tree.
///
/// Every lookup a [`Node`] offers is available on the document and acts on the
/// root.
///
/// ```
/// use jsonview::api::parse;
///
/// let doc = parse(r#"{"list":[{"id":"1234"},{"id":"abcd"}]}"#);
/// let ids: Vec<&str> = doc
///     .get("list")
///     .children()
///     .filter_map(|item| item.get("id").extract_opt())
///     .collect();
/// assert_eq!(ids, ["1234", "abcd"]);
///
/// let broken = parse("{");
/// assert!(!broken.truthy());
/// assert!(broken.parse_error().is_some());
/// ```
pub struct Document<T: Tree = Arena> {
    shared: Rc<Shared<T>>,
}

struct Shared<T: Tree> {
    tree: Option<T>,
    error: Option<Error>,
}

impl<T: Tree> Drop for Shared<T> {
    fn drop(&mut self) {
        if self.tree.is_some() {
            tracing::trace!("releasing parsed tree");
        }
    }
}

impl<T: Tree> Document<T> {
    /// Takes ownership of an already built tree.
    pub fn from_tree(tree: T) -> Self {
        Self::from_shared(Some(tree), None)
    }

    /// Parses with `parser`; a failure yields a document with an absent root.
    pub fn parse_with<P>(parser: &P, text: &str) -> Self
    where
        P: Parser<Tree = T> + ?Sized,
    {
        Self::from_result(parser.parse_text(text))
    }

    /// Parses with `parser`, returning the failure instead of retaining it.
    pub fn try_parse_with<P>(parser: &P, text: &str) -> Result<Self, Error>
    where
        P: Parser<Tree = T> + ?Sized,
    {
        parser.parse_text(text).map(Self::from_tree)
    }

    pub(crate) fn from_result(result: Result<T, Error>) -> Self {
        match result {
            Ok(tree) => Self::from_tree(tree),
            Err(err) => {
                tracing::debug!(error = %err, "parse failed; document root is absent");
                Self::from_shared(None, Some(err))
            }
        }
    }

    fn from_shared(tree: Option<T>, error: Option<Error>) -> Self {
        Self {
            shared: Rc::new(Shared { tree, error }),
        }
    }

    /// The failure retained by a lazily failing parse.
    pub fn parse_error(&self) -> Option<&Error> {
        self.shared.error.as_ref()
    }

    pub fn is_parsed(&self) -> bool {
        self.shared.tree.is_some()
    }

    pub fn tree(&self) -> Option<&T> {
        self.shared.tree.as_ref()
    }

    pub fn root(&self) -> Node<'_, T> {
        match self.tree() {
            Some(tree) => Node::root(tree),
            None => Node::absent(),
        }
    }

    pub fn get<I: Index>(&self, index: I) -> Node<'_, T> {
        self.root().get(index)
    }

    pub fn size(&self) -> usize {
        self.root().size()
    }

    pub fn truthy(&self) -> bool {
        self.root().truthy()
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.root().kind()
    }

    pub fn extract_opt<'a, V: FromNode<'a>>(&'a self) -> Option<V> {
        self.root().extract_opt()
    }

    pub fn extract_or<'a, V: FromNode<'a>>(&'a self, fallback: V) -> V {
        self.root().extract_or(fallback)
    }

    pub fn extract<'a, V: FromNode<'a>>(&'a self) -> Result<V, Error> {
        self.root().extract()
    }

    pub fn children(&self) -> Children<'_, T> {
        self.root().children()
    }

    pub fn begin(&self) -> Children<'_, T> {
        self.root().begin()
    }

    pub fn end(&self) -> Children<'_, T> {
        Children::end()
    }
}

impl Document<Arena> {
    /// Lazy parse of a UTF-8 buffer; invalid UTF-8 is a parse failure.
    pub fn parse_bytes_with(parser: &JsonParser, bytes: &[u8]) -> Self {
        Self::from_result(parser.parse_bytes(bytes))
    }

    pub fn try_parse_bytes_with(parser: &JsonParser, bytes: &[u8]) -> Result<Self, Error> {
        parser.parse_bytes(bytes).map(Self::from_tree)
    }
}

impl<T: Tree> Clone for Document<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Tree> PartialEq for Document<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T: Tree> Eq for Document<T> {}

impl<T: Tree> fmt::Debug for Document<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root())
            .field("error", &self.shared.error)
            .field("handles", &Rc::strong_count(&self.shared))
            .finish()
    }
}

impl<'a, T: Tree> IntoIterator for &'a Document<T> {
    type Item = Node<'a, T>;
    type IntoIter = Children<'a, T>;

    fn into_iter(self) -> Children<'a, T> {
        self.children()
    }
}
