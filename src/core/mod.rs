// Core modules: tree contract, node storage, handles, iteration, and errors.
pub mod arena;
pub mod document;
pub mod error;
pub mod extract;
pub mod iter;
pub mod node;
pub mod tree;
