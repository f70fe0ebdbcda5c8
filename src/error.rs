use crate::ids::TodoId;
use thiserror::Error;

/// Failure outcomes of to-do operations.
///
/// These are the only errors a request can end in; each maps to exactly one
/// HTTP status at the handler boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    /// A required field was missing or blank.
    #[error("{0}")]
    Validation(String),

    #[error("todo {0} not found")]
    NotFound(TodoId),

    /// The request could not be decoded (malformed JSON body, bad query value).
    #[error("{0}")]
    BadRequest(String),
}

impl TodoError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            TodoError::Validation(_) | TodoError::BadRequest(_) => 400,
            TodoError::NotFound(_) => 404,
        }
    }
}

pub type TodoResult<T> = Result<T, TodoError>;
