//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod delete_message;
pub mod edit_message;
pub mod error;
pub mod get_messages;
pub mod send_message;

pub use delete_message::DeleteMessageUseCase;
pub use edit_message::EditMessageUseCase;
pub use error::{HistoryError, MessageUseCaseError};
pub use get_messages::GetMessagesUseCase;
pub use send_message::SendMessageUseCase;
