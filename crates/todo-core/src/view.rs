//! Ordering helpers used when rendering
//!
//! Both sorts are stable partitions: incomplete entries first, then
//! completed ones, each group keeping its original relative order.

use crate::list::{Todo, TodoList};

/// CSS-style class for a list summary.
pub fn list_class(list: &TodoList) -> &'static str {
    if list.is_completed() {
        "complete"
    } else {
        ""
    }
}

/// Lists paired with their position in the collection, incomplete first.
pub fn sort_lists(lists: &[TodoList]) -> Vec<(usize, &TodoList)> {
    let (complete, incomplete): (Vec<_>, Vec<_>) = lists
        .iter()
        .enumerate()
        .partition(|(_, list)| list.is_completed());

    incomplete.into_iter().chain(complete).collect()
}

/// Todos ordered incomplete first. Todos carry their own id.
pub fn sort_todos(todos: &[Todo]) -> Vec<&Todo> {
    let (complete, incomplete): (Vec<&Todo>, Vec<&Todo>) =
        todos.iter().partition(|todo| todo.completed);

    incomplete.into_iter().chain(complete).collect()
}
