//! UseCase: チャット履歴の一覧取得
//!
//! 論理削除済みのメッセージは返さない。閲覧者が分かる場合は is_author を立てる。

use std::sync::Arc;

use crate::domain::{Message, MessageRepository, TipId, UserId};

use super::error::HistoryError;

/// チャット履歴取得のユースケース
pub struct GetMessagesUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl GetMessagesUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 作成日時の昇順でメッセージ一覧を返す
    pub async fn execute(
        &self,
        tip_id: &TipId,
        viewer: Option<&UserId>,
    ) -> Result<Vec<Message>, HistoryError> {
        let messages = self.repository.list_by_tip(tip_id).await?;

        Ok(messages
            .into_iter()
            .filter(|m| !m.is_deleted())
            .map(|mut m| {
                m.mark_author_for(viewer);
                m
            })
            .collect())
    }
}
