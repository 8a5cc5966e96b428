//! Turns inbound frames into persisted mutations and room broadcasts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    domain::{MessageId, MessageRepository, TipId},
    infrastructure::dto::websocket::{
        DeleteBroadcastMessage, EditBroadcastMessage, InboundMessage, MessageType,
        SendBroadcastMessage,
    },
    usecase::{DeleteMessageUseCase, EditMessageUseCase, MessageUseCaseError, SendMessageUseCase},
};

use super::{DispatchError, connection::Connection, connection::FrameHandler, hub::Hub};

/// Frame handler shared by every connection.
///
/// Failed requests are logged and dropped: no reply frame, no broadcast, and
/// the connection keeps running.
pub struct Dispatcher {
    hub: Arc<Hub>,
    send_usecase: SendMessageUseCase,
    edit_usecase: EditMessageUseCase,
    delete_usecase: DeleteMessageUseCase,
}

impl Dispatcher {
    pub fn new(hub: Arc<Hub>, repository: Arc<dyn MessageRepository>) -> Self {
        Self {
            hub,
            send_usecase: SendMessageUseCase::new(repository.clone()),
            edit_usecase: EditMessageUseCase::new(repository.clone()),
            delete_usecase: DeleteMessageUseCase::new(repository),
        }
    }

    /// Decode, authorize, persist. Returns the JSON frame to broadcast.
    pub async fn dispatch(&self, raw: &str, conn: &Connection) -> Result<String, DispatchError> {
        let request: InboundMessage = serde_json::from_str(raw)?;
        let tip_id = conn.tip_id();
        if let Some(frame_tip) = request.tip_id.as_deref()
            && !frame_tip.is_empty()
            && frame_tip != tip_id.as_str()
        {
            return Err(DispatchError::RoomMismatch {
                frame: frame_tip.to_string(),
                bound: tip_id.to_string(),
            });
        }

        match request.r#type {
            MessageType::Send => {
                let content = request.content.unwrap_or_default();
                let message = conn
                    .until_closed(self.send_usecase.execute(
                        conn.user_id().clone(),
                        tip_id.clone(),
                        content,
                    ))
                    .await
                    .ok_or(DispatchError::Cancelled)??;
                encode(&SendBroadcastMessage::from(&message))
            }
            MessageType::Edit => {
                let message_id = required_message_id(request.message_id)?;
                let content = request.content.unwrap_or_default();
                let message = conn
                    .until_closed(self.edit_usecase.execute(
                        conn.user_id(),
                        tip_id,
                        &message_id,
                        content,
                    ))
                    .await
                    .ok_or(DispatchError::Cancelled)??;
                encode(&EditBroadcastMessage::from(&message))
            }
            MessageType::Delete => {
                let message_id = required_message_id(request.message_id)?;
                let message = conn
                    .until_closed(self.delete_usecase.execute(conn.user_id(), tip_id, &message_id))
                    .await
                    .ok_or(DispatchError::Cancelled)??;
                encode(&DeleteBroadcastMessage::from(&message))
            }
        }
    }

    fn broadcast(&self, tip_id: &TipId, frame: &str) {
        match self.hub.room(tip_id) {
            Some(room) => {
                let delivered = room.broadcast(frame);
                tracing::debug!(tip_id = %tip_id, delivered, members = room.len(), "broadcast sent");
            }
            None => tracing::debug!(tip_id = %tip_id, "room gone, broadcast skipped"),
        }
    }
}

#[async_trait]
impl FrameHandler for Dispatcher {
    async fn handle(&self, raw: &str, conn: &Connection) {
        match self.dispatch(raw, conn).await {
            Ok(frame) => self.broadcast(conn.tip_id(), &frame),
            Err(e) => tracing::warn!(
                conn = %conn.id(),
                user_id = %conn.user_id(),
                tip_id = %conn.tip_id(),
                "request rejected: {}",
                e
            ),
        }
    }
}

fn required_message_id(raw: Option<String>) -> Result<MessageId, MessageUseCaseError> {
    match raw {
        Some(id) if !id.is_empty() => Ok(MessageId::try_from(id)?),
        _ => Err(MessageUseCaseError::MissingMessageId),
    }
}

fn encode<T: Serialize>(frame: &T) -> Result<String, DispatchError> {
    serde_json::to_string(frame).map_err(DispatchError::Encode)
}
