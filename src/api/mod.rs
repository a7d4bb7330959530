//! Purpose: Define the public Rust API boundary for jsonview.
//! Exports: Parse entry points, `Document`, `Node`, `Children`, `FromNode`, the collaborator traits, errors.
//! Role: Public, additive-only surface used by the CLI and integration tests.
//! Invariants: `parse*` never fail; failures are retained on the returned document.
//! Invariants: `try_parse*` surface the same failure as `ErrorKind::Parse`.

pub use crate::core::arena::Arena;
pub use crate::core::document::Document;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind, ParseFailureCategory};
pub use crate::core::extract::FromNode;
pub use crate::core::iter::Children;
pub use crate::core::node::{Index, Node};
pub use crate::core::tree::{NodeId, NodeKind, Parser, Tree};
pub use crate::json::parse::{DEFAULT_MAX_DEPTH, JsonParser, ParseOptions};

/// Parses `text` with the default parser; malformed input yields an absent root.
pub fn parse(text: &str) -> Document {
    Document::parse_with(&JsonParser::new(), text)
}

/// Like [`parse`], over a UTF-8 buffer.
pub fn parse_bytes(bytes: &[u8]) -> Document {
    Document::parse_bytes_with(&JsonParser::new(), bytes)
}

pub fn try_parse(text: &str) -> Result<Document, Error> {
    Document::try_parse_with(&JsonParser::new(), text)
}

pub fn try_parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
    Document::try_parse_bytes_with(&JsonParser::new(), bytes)
}
