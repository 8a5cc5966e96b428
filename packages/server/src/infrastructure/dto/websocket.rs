//! WebSocket message DTOs for the chat application.

use serde::{Deserialize, Serialize};
use tipchat_shared::time::to_unix_seconds;

use crate::domain::Message;

/// Message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Send,
    Edit,
    Delete,
}

/// Request frame sent by a client.
///
/// Any `user_id` a client puts in the payload is ignored; the acting user is
/// the identity bound to the connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub r#type: MessageType,
    /// Required for edit and delete
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub tip_id: Option<String>,
    /// Required for send and edit
    #[serde(default)]
    pub content: Option<String>,
}

/// Broadcast for a newly sent message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendBroadcastMessage {
    pub r#type: MessageType,
    pub message_id: String,
    pub tip_id: String,
    pub content: String,
    /// Unix timestamp (seconds) of creation
    pub timestamp: i64,
}

/// Broadcast for an edited message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBroadcastMessage {
    pub r#type: MessageType,
    pub message_id: String,
    pub tip_id: String,
    pub new_content: String,
    /// Unix timestamp (seconds) of the edit
    pub edited_at: i64,
}

/// Broadcast for a soft-deleted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBroadcastMessage {
    pub r#type: MessageType,
    pub message_id: String,
    pub tip_id: String,
    /// Unix timestamp (seconds) of the deletion
    pub deleted_at: i64,
}

impl From<&Message> for SendBroadcastMessage {
    fn from(message: &Message) -> Self {
        Self {
            r#type: MessageType::Send,
            message_id: message.id().as_str().to_string(),
            tip_id: message.tip_id().as_str().to_string(),
            content: message.content().as_str().to_string(),
            timestamp: to_unix_seconds(&message.created_at()),
        }
    }
}

impl From<&Message> for EditBroadcastMessage {
    fn from(message: &Message) -> Self {
        Self {
            r#type: MessageType::Edit,
            message_id: message.id().as_str().to_string(),
            tip_id: message.tip_id().as_str().to_string(),
            new_content: message.content().as_str().to_string(),
            edited_at: to_unix_seconds(&message.updated_at()),
        }
    }
}

impl From<&Message> for DeleteBroadcastMessage {
    fn from(message: &Message) -> Self {
        Self {
            r#type: MessageType::Delete,
            message_id: message.id().as_str().to_string(),
            tip_id: message.tip_id().as_str().to_string(),
            deleted_at: message
                .deleted_at()
                .map(|at| to_unix_seconds(&at))
                .unwrap_or_default(),
        }
    }
}
