// Error types for edit sessions and agent stores

use thiserror::Error;

use crate::field::FieldId;

/// Result type alias for edit session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by the edit session when a caller breaks a precondition
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Field is not part of this session's field list
    #[error("Field '{0}' is not editable for this agent")]
    NotInFieldList(FieldId),

    /// Commit targeted a field other than the active one
    #[error("Field '{field}' is not the active field")]
    NotActive { field: FieldId },

    /// Commit used the wrong value kind for the field
    #[error("Field '{0}' cannot accept this kind of value")]
    WrongFieldKind(FieldId),

    /// Mutation attempted while a save is in flight
    #[error("A save is already in progress")]
    SaveInFlight,
}

/// Errors surfaced by an agent store (the backend transport)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Agent does not exist
    #[error("Agent not found: {0}")]
    NotFound(String),

    /// Backend answered with an error status
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// Backend could not be reached or answered with garbage
    #[error("{0}")]
    Transport(String),
}

impl StoreError {
    /// Create a rejection error
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        StoreError::Rejected {
            status,
            detail: detail.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        StoreError::Transport(msg.into())
    }
}

/// Errors from saving a session through a store
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
