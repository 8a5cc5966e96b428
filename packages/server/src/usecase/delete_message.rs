//! UseCase: メッセージ論理削除処理

use std::sync::Arc;

use crate::domain::{Message, MessageId, MessageRepository, TipId, UserId};

use super::error::MessageUseCaseError;

/// メッセージ論理削除のユースケース
pub struct DeleteMessageUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl DeleteMessageUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 論理削除を実行し、deleted_at が入ったメッセージを返す
    pub async fn execute(
        &self,
        actor: &UserId,
        tip_id: &TipId,
        message_id: &MessageId,
    ) -> Result<Message, MessageUseCaseError> {
        let mut message = self
            .repository
            .fetch_by_id(message_id)
            .await
            .map_err(MessageUseCaseError::from_fetch)?;
        // 別ルームのメッセージは存在しないものとして扱う
        if message.tip_id() != tip_id {
            return Err(MessageUseCaseError::NotFound(message_id.as_str().to_string()));
        }

        message.delete(actor)?;
        self.repository.soft_delete(&message).await?;

        Ok(message)
    }
}
