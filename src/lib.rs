//! Purpose: Library crate behind the `jsonview` CLI: typed handles over a parsed JSON tree.
//! Exports: `api` (parse entry points, handles, iterator, errors) and `core`.
//! Role: Thin adapter; parsing and node storage belong to a `Parser`/`Tree` collaborator.
//! Invariants: Reads never mutate the tree; lookups never fail, only extraction does.
//! Invariants: Handles borrow their document, so none outlives the tree it points into.
pub mod api;
pub mod core;
mod json;
