//! Repository trait for message persistence.
//!
//! The domain defines the contract; concrete stores live in the
//! infrastructure layer (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::Message,
    error::RepositoryError,
    value_object::{MessageId, TipId},
};

/// Persistence contract for `Message`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Load a message by id, including soft-deleted ones.
    ///
    /// Returns `RepositoryError::NotFound` for unknown ids.
    async fn fetch_by_id(&self, id: &MessageId) -> Result<Message, RepositoryError>;

    /// Persist a newly created message.
    async fn insert(&self, message: &Message) -> Result<(), RepositoryError>;

    /// Persist an edit (content and updated-at). Fails for unknown ids.
    async fn update(&self, message: &Message) -> Result<(), RepositoryError>;

    /// Persist a soft delete (deleted-at only). Fails for unknown ids.
    async fn soft_delete(&self, message: &Message) -> Result<(), RepositoryError>;

    /// All messages of a tip room, oldest first.
    async fn list_by_tip(&self, tip_id: &TipId) -> Result<Vec<Message>, RepositoryError>;
}
