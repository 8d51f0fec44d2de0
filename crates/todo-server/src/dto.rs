//! Typed request bodies and path parameters
//!
//! Form fields default to empty so a missing field reaches validation
//! instead of failing extraction. Path ids stay strings until the handler
//! parses them; a malformed id is reported as "not found".

use serde::Deserialize;
use todo_core::TodoId;

#[derive(Debug, Deserialize)]
pub struct ListNameForm {
    #[serde(default)]
    pub list_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    pub todo: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoStatusForm {
    #[serde(default)]
    pub completed: String,
}

impl TodoStatusForm {
    /// Only the literal `"true"` marks a todo completed.
    pub fn is_completed(&self) -> bool {
        self.completed == "true"
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPath {
    pub list_id: String,
}

impl ListPath {
    pub fn index(&self) -> Option<usize> {
        self.list_id.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
pub struct TodoPath {
    pub list_id: String,
    pub todo_id: String,
}

impl TodoPath {
    pub fn index(&self) -> Option<usize> {
        self.list_id.parse().ok()
    }

    pub fn todo_id(&self) -> Option<TodoId> {
        self.todo_id.parse().ok()
    }
}
