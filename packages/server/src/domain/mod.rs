//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::Message;
pub use error::{MessageError, RepositoryError, ValueObjectError};
pub use factory::MessageIdFactory;
pub use repository::MessageRepository;
#[cfg(test)]
pub use repository::MockMessageRepository;
pub use value_object::{MessageContent, MessageId, TipId, UserId};
