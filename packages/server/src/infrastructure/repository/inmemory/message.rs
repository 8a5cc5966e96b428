//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! update / soft_delete は RDB の `UPDATE ... SET ... WHERE deleted_at IS NULL`
//! と同じく、未削除の行の対応するカラム（content と updated_at、または
//! deleted_at）だけを書き換えます。読み取りから書き込みまでの間に別の接続が
//! 論理削除していた場合は AlreadyDeleted になります。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Message, MessageId, MessageRepository, RepositoryError, TipId};

struct Row {
    /// Insertion order, used to break created_at ties
    seq: u64,
    message: Message,
}

#[derive(Default)]
struct Table {
    rows: HashMap<MessageId, Row>,
    next_seq: u64,
}

/// インメモリ Message Repository 実装
#[derive(Default)]
pub struct InMemoryMessageRepository {
    table: Mutex<Table>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn fetch_by_id(&self, id: &MessageId) -> Result<Message, RepositoryError> {
        let table = self.table.lock().await;
        table
            .rows
            .get(id)
            .map(|row| row.message.clone())
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    async fn insert(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        if table.rows.contains_key(message.id()) {
            return Err(RepositoryError::Duplicate(message.id().clone()));
        }

        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(
            message.id().clone(),
            Row {
                seq,
                message: message.clone(),
            },
        );
        Ok(())
    }

    async fn update(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        let row = table
            .rows
            .get_mut(message.id())
            .ok_or_else(|| RepositoryError::NotFound(message.id().clone()))?;

        let stored = &row.message;
        if stored.is_deleted() {
            return Err(RepositoryError::AlreadyDeleted(message.id().clone()));
        }
        row.message = Message::reconstruct(
            stored.id().clone(),
            stored.tip_id().clone(),
            stored.author_id().clone(),
            message.content().clone(),
            stored.created_at(),
            message.updated_at(),
            stored.deleted_at(),
        );
        Ok(())
    }

    async fn soft_delete(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        let row = table
            .rows
            .get_mut(message.id())
            .ok_or_else(|| RepositoryError::NotFound(message.id().clone()))?;

        let stored = &row.message;
        if stored.is_deleted() {
            return Err(RepositoryError::AlreadyDeleted(message.id().clone()));
        }
        row.message = Message::reconstruct(
            stored.id().clone(),
            stored.tip_id().clone(),
            stored.author_id().clone(),
            stored.content().clone(),
            stored.created_at(),
            stored.updated_at(),
            message.deleted_at(),
        );
        Ok(())
    }

    async fn list_by_tip(&self, tip_id: &TipId) -> Result<Vec<Message>, RepositoryError> {
        let table = self.table.lock().await;
        let mut rows: Vec<&Row> = table
            .rows
            .values()
            .filter(|row| row.message.tip_id() == tip_id)
            .collect();
        rows.sort_by_key(|row| (row.message.created_at(), row.seq));

        Ok(rows.into_iter().map(|row| row.message.clone()).collect())
    }
}
