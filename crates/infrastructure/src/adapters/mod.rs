//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod todos_adapter;

pub use todos_adapter::{ResilientTodos, TODOS_SERVICE, TodosAdapter};
