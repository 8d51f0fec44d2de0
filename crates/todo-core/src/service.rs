//! Operations on one session's list collection
//!
//! Lists are addressed by position, todos by id. Every operation either
//! completes fully or leaves the collection untouched.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};
use crate::list::{Todo, TodoId, TodoList};
use crate::validation::{error_for_list_name, error_for_todo_name};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TodoLists {
    lists: Vec<TodoList>,
}

impl TodoLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_all(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&TodoList> {
        self.lists.get(index).ok_or(TodoError::ListNotFound)
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut TodoList> {
        self.lists.get_mut(index).ok_or(TodoError::ListNotFound)
    }

    /// Trims `name`, validates it and appends an empty list.
    pub fn create_list(&mut self, name: &str) -> Result<&TodoList> {
        let name = name.trim();
        if let Some(error) = error_for_list_name(name, self.lists.iter().map(|l| l.name.as_str())) {
            return Err(error);
        }

        self.lists.push(TodoList::new(name));
        debug!("Created list '{}' at position {}", name, self.lists.len() - 1);
        Ok(&self.lists[self.lists.len() - 1])
    }

    /// Renames the list at `index`.
    ///
    /// Uniqueness is checked against the other lists only, so submitting
    /// the current name unchanged succeeds.
    pub fn rename_list(&mut self, index: usize, name: &str) -> Result<&TodoList> {
        self.get(index)?;

        let name = name.trim();
        let others = self
            .lists
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, l)| l.name.as_str());
        if let Some(error) = error_for_list_name(name, others) {
            return Err(error);
        }

        let list = self.get_mut(index)?;
        list.name = name.to_string();
        Ok(&*list)
    }

    /// Removes and returns the list at `index`. Later lists shift down.
    pub fn delete_list(&mut self, index: usize) -> Result<TodoList> {
        self.get(index)?;
        Ok(self.lists.remove(index))
    }

    pub fn add_todo(&mut self, index: usize, name: &str) -> Result<&Todo> {
        let list = self.get_mut(index)?;

        let name = name.trim();
        if let Some(error) = error_for_todo_name(name) {
            return Err(error);
        }

        let id = list.next_todo_id();
        list.todos.push(Todo::new(id, name));
        debug!("Added todo {} to list '{}'", id, list.name);
        Ok(&list.todos[list.todos.len() - 1])
    }

    pub fn delete_todo(&mut self, index: usize, todo_id: TodoId) -> Result<Todo> {
        let list = self.get_mut(index)?;
        let position = list
            .todos
            .iter()
            .position(|todo| todo.id == todo_id)
            .ok_or(TodoError::TodoNotFound)?;
        Ok(list.todos.remove(position))
    }

    pub fn set_todo_status(
        &mut self,
        index: usize,
        todo_id: TodoId,
        completed: bool,
    ) -> Result<&Todo> {
        let todo = self
            .get_mut(index)?
            .find_todo_mut(todo_id)
            .ok_or(TodoError::TodoNotFound)?;
        todo.completed = completed;
        Ok(&*todo)
    }

    pub fn complete_all(&mut self, index: usize) -> Result<&TodoList> {
        let list = self.get_mut(index)?;
        for todo in &mut list.todos {
            todo.completed = true;
        }
        Ok(&*list)
    }
}
