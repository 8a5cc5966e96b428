//! UseCase: メッセージ編集処理
//!
//! 既存メッセージを取得し、Domain Model のルール（投稿者本人・未削除・空でない内容）
//! を通過した場合のみ永続化する。

use std::sync::Arc;

use crate::domain::{Message, MessageId, MessageRepository, TipId, UserId};

use super::error::MessageUseCaseError;

/// メッセージ編集のユースケース
pub struct EditMessageUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl EditMessageUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// メッセージ編集を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 編集・永続化済みのメッセージ
    /// * `Err(MessageUseCaseError)` - NotFound / Unauthorized / AlreadyDeleted /
    ///   Validation / Persistence
    pub async fn execute(
        &self,
        actor: &UserId,
        tip_id: &TipId,
        message_id: &MessageId,
        new_content: String,
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

        message.edit(actor, new_content)?;
        self.repository.update(&message).await?;

        Ok(message)
    }
}
