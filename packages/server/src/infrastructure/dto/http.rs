//! HTTP API response DTOs for the chat application.

use serde::{Deserialize, Serialize};
use tipchat_shared::time::to_unix_seconds;

use crate::domain::Message;

/// One entry of the chat history endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub message_id: String,
    pub tip_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: i64, // Unix timestamp (seconds)
    pub updated_at: i64, // Unix timestamp (seconds)
    pub is_author: bool,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            message_id: message.id().as_str().to_string(),
            tip_id: message.tip_id().as_str().to_string(),
            user_id: message.author_id().as_str().to_string(),
            content: message.content().as_str().to_string(),
            created_at: to_unix_seconds(&message.created_at()),
            updated_at: to_unix_seconds(&message.updated_at()),
            is_author: message.is_author(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}
