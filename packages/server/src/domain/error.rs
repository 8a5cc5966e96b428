//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::MessageId;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// MessageId validation error
    #[error("MessageId cannot be empty")]
    MessageIdEmpty,

    /// MessageId too long error
    #[error("MessageId cannot exceed {max} characters (got {actual})")]
    MessageIdTooLong { max: usize, actual: usize },

    /// TipId validation error
    #[error("TipId cannot be empty")]
    TipIdEmpty,

    /// TipId too long error
    #[error("TipId cannot exceed {max} characters (got {actual})")]
    TipIdTooLong { max: usize, actual: usize },

    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// UserId too long error
    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors raised by the `Message` entity's mutation rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    /// The acting user is not the author of the message
    #[error("user '{actor}' is not allowed to modify message '{message_id}'")]
    Unauthorized { actor: String, message_id: String },

    /// The message was already soft-deleted
    #[error("message '{0}' has already been deleted")]
    AlreadyDeleted(String),
}

/// Errors surfaced by `MessageRepository` implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("message '{0}' not found")]
    NotFound(MessageId),

    #[error("message '{0}' already exists")]
    Duplicate(MessageId),

    /// The stored row was soft-deleted by a concurrent writer
    #[error("message '{0}' has already been deleted")]
    AlreadyDeleted(MessageId),

    /// Backend failure (connection lost, constraint violation, ...)
    #[error("storage error: {0}")]
    Storage(String),
}
