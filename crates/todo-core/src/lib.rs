//! Core types for session-backed todo lists.
//!
//! Everything here is plain data plus the operations a request handler
//! performs on one session's list collection. HTTP concerns live in
//! `todo-server`.

pub mod error;
pub mod list;
pub mod service;
pub mod validation;
pub mod view;

pub use error::{Result, TodoError};
pub use list::{Todo, TodoId, TodoList};
pub use service::TodoLists;
pub use validation::{error_for_list_name, error_for_todo_name, NAME_MAX_CHARS, NAME_MIN_CHARS};
pub use view::{list_class, sort_lists, sort_todos};
