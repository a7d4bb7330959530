//! Purpose: JSON decoding boundary for the default collaborator.
//! Exports: `parse` module with `JsonParser` and `ParseOptions`.
//! Role: Single seam for serde_json so handles never see parser details.
//! Invariants: All text-to-tree decoding in the crate goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
