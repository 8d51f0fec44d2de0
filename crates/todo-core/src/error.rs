use thiserror::Error;

/// Failures of list and todo operations.
///
/// The `Display` text is shown to the user as a flash message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    #[error("The list name must be between 1 and 100 characters.")]
    InvalidListName,

    #[error("List name must be unique.")]
    DuplicateListName,

    #[error("The todo name must be between 1 and 100 characters.")]
    InvalidTodoName,

    #[error("The specified list was not found.")]
    ListNotFound,

    #[error("The specified todo was not found.")]
    TodoNotFound,
}

impl TodoError {
    /// Bad user input; the originating form should be shown again.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TodoError::InvalidListName | TodoError::DuplicateListName | TodoError::InvalidTodoName
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoError::ListNotFound | TodoError::TodoNotFound)
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
