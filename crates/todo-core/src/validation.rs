//! Name validation for lists and todos
//!
//! Names are expected to be trimmed by the caller. Length is counted in
//! characters, not bytes.

use crate::error::TodoError;

pub const NAME_MIN_CHARS: usize = 1;
pub const NAME_MAX_CHARS: usize = 100;

fn has_valid_length(name: &str) -> bool {
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name.chars().count())
}

/// Returns the error for an invalid list name, or `None` if it may be used.
///
/// `existing` holds the names the new name must not collide with. The
/// comparison is exact and case-sensitive.
pub fn error_for_list_name<'a>(
    name: &str,
    mut existing: impl Iterator<Item = &'a str>,
) -> Option<TodoError> {
    if !has_valid_length(name) {
        Some(TodoError::InvalidListName)
    } else if existing.any(|other| other == name) {
        Some(TodoError::DuplicateListName)
    } else {
        None
    }
}

pub fn error_for_todo_name(name: &str) -> Option<TodoError> {
    if has_valid_length(name) {
        None
    } else {
        Some(TodoError::InvalidTodoName)
    }
}
