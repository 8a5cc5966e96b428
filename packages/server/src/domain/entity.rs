//! Core domain models for the chat application.

use chrono::{DateTime, Utc};
use tipchat_shared::time::now_utc;

use super::{
    error::MessageError,
    value_object::{MessageContent, MessageId, TipId, UserId},
};

/// A chat message posted to a tip room.
///
/// Messages are never hard-deleted. A delete stamps `deleted_at`, which is
/// permanent: a deleted message can be neither edited nor deleted again.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    tip_id: TipId,
    author_id: UserId,
    content: MessageContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    /// Presentation-only flag, never persisted.
    is_author: bool,
}

impl Message {
    /// Create a new message authored by `author_id`.
    ///
    /// `created_at` and `updated_at` are both set to the current time.
    ///
    /// # Errors
    ///
    /// Returns `MessageError::Validation` if `content` is empty or too long.
    pub fn create(
        id: MessageId,
        tip_id: TipId,
        author_id: UserId,
        content: String,
    ) -> Result<Self, MessageError> {
        let content = MessageContent::try_from(content)?;
        let now = now_utc();
        Ok(Self {
            id,
            tip_id,
            author_id,
            content,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            is_author: false,
        })
    }

    /// Rebuild a message from stored state.
    ///
    /// Meant for `MessageRepository` implementations loading rows back.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: MessageId,
        tip_id: TipId,
        author_id: UserId,
        content: MessageContent,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            tip_id,
            author_id,
            content,
            created_at,
            updated_at,
            deleted_at,
            is_author: false,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn tip_id(&self) -> &TipId {
        &self.tip_id
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_author(&self) -> bool {
        self.is_author
    }

    /// Compute the presentation flag for the given viewer.
    pub fn mark_author_for(&mut self, viewer: Option<&UserId>) {
        self.is_author = viewer.is_some_and(|v| v == &self.author_id);
    }

    /// Whether `actor` may edit this message right now.
    pub fn can_edit(&self, actor: &UserId) -> bool {
        &self.author_id == actor && self.deleted_at.is_none()
    }

    /// Replace the content and bump `updated_at`.
    ///
    /// Checks run in order: ownership, deletion state, then content. The
    /// message is left untouched when any check fails.
    pub fn edit(&mut self, actor: &UserId, new_content: String) -> Result<(), MessageError> {
        self.ensure_author(actor)?;
        self.ensure_not_deleted()?;
        let content = MessageContent::new(new_content)?;

        self.content = content;
        self.updated_at = now_utc();
        Ok(())
    }

    /// Soft-delete the message by stamping `deleted_at`.
    pub fn delete(&mut self, actor: &UserId) -> Result<(), MessageError> {
        self.ensure_author(actor)?;
        self.ensure_not_deleted()?;

        self.deleted_at = Some(now_utc());
        Ok(())
    }

    fn ensure_author(&self, actor: &UserId) -> Result<(), MessageError> {
        if &self.author_id != actor {
            return Err(MessageError::Unauthorized {
                actor: actor.as_str().to_string(),
                message_id: self.id.as_str().to_string(),
            });
        }
        Ok(())
    }

    fn ensure_not_deleted(&self) -> Result<(), MessageError> {
        if self.deleted_at.is_some() {
            return Err(MessageError::AlreadyDeleted(self.id.as_str().to_string()));
        }
        Ok(())
    }
}
