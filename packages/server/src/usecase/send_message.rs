//! UseCase: メッセージ送信処理
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 新しい ID の採番、Message の生成、永続化
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージが生成・保存され、保存された内容が返る
//! - 異常系：空の内容（保存されない）、永続化の失敗

use std::sync::Arc;

use crate::domain::{Message, MessageIdFactory, MessageRepository, TipId, UserId};

use super::error::MessageUseCaseError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn MessageRepository>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `author_id` - 接続時に確定したユーザー ID
    /// * `tip_id` - 送信先のルーム
    /// * `content` - メッセージ内容
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 永続化済みのメッセージ
    /// * `Err(MessageUseCaseError)` - 送信失敗
    pub async fn execute(
        &self,
        author_id: UserId,
        tip_id: TipId,
        content: String,
    ) -> Result<Message, MessageUseCaseError> {
        let id = MessageIdFactory::generate()?;
        let message = Message::create(id, tip_id, author_id, content)?;

        self.repository.insert(&message).await?;

        tracing::debug!(
            message_id = %message.id(),
            tip_id = %message.tip_id(),
            "message persisted"
        );
        Ok(message)
    }
}
