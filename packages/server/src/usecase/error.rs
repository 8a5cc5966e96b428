//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{MessageError, RepositoryError, ValueObjectError};

/// メッセージ変更系ユースケース（send / edit / delete）のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageUseCaseError {
    /// 入力値が不正（空の内容、不正な ID など）
    #[error("validation failed: {0}")]
    Validation(#[from] ValueObjectError),

    /// edit / delete に message_id が含まれていない
    #[error("message_id is required")]
    MissingMessageId,

    /// 投稿者以外による変更
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 対象メッセージが存在しない
    #[error("message '{0}' not found")]
    NotFound(String),

    /// 削除済みメッセージへの変更
    #[error("message '{0}' has already been deleted")]
    AlreadyDeleted(String),

    /// 永続化の失敗
    #[error("persistence failed: {0}")]
    Persistence(#[source] RepositoryError),
}

impl MessageUseCaseError {
    /// fetch 時の NotFound だけは永続化エラーではなく NotFound として扱う
    pub(crate) fn from_fetch(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::NotFound(id.into_string()),
            other => Self::from(other),
        }
    }
}

impl From<MessageError> for MessageUseCaseError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Validation(e) => Self::Validation(e),
            e @ MessageError::Unauthorized { .. } => Self::Unauthorized(e.to_string()),
            MessageError::AlreadyDeleted(id) => Self::AlreadyDeleted(id),
        }
    }
}

impl From<RepositoryError> for MessageUseCaseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 読み取り後に別リクエストが論理削除した
            RepositoryError::AlreadyDeleted(id) => Self::AlreadyDeleted(id.into_string()),
            other => Self::Persistence(other),
        }
    }
}

/// 履歴取得ユースケースのエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("failed to list messages: {0}")]
    Repository(#[from] RepositoryError),
}
