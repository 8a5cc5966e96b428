//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum length of any identifier value object, in characters.
pub const MAX_ID_LENGTH: usize = 100;

/// Maximum length of a message body, in characters.
pub const MAX_CONTENT_LENGTH: usize = 10000;

fn validate_id(
    id: &str,
    empty: ValueObjectError,
    too_long: impl FnOnce(usize) -> ValueObjectError,
) -> Result<(), ValueObjectError> {
    if id.is_empty() {
        return Err(empty);
    }
    let len = id.chars().count();
    if len > MAX_ID_LENGTH {
        return Err(too_long(len));
    }
    Ok(())
}

/// Message identifier value object.
///
/// Opaque to the domain; new ids are minted by `MessageIdFactory`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new MessageId.
    ///
    /// # Errors
    ///
    /// Fails if the id is empty or longer than [`MAX_ID_LENGTH`].
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        validate_id(&id, ValueObjectError::MessageIdEmpty, |actual| {
            ValueObjectError::MessageIdTooLong {
                max: MAX_ID_LENGTH,
                actual,
            }
        })?;
        Ok(Self(id))
    }

    /// Create a MessageId from a UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Result<Self, ValueObjectError> {
        Self::new(uuid.to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tip identifier value object.
///
/// A tip is the external entity a chat room is attached to, so this id doubles
/// as the room id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TipId(String);

impl TipId {
    /// Create a new TipId.
    ///
    /// # Errors
    ///
    /// Fails if the id is empty or longer than [`MAX_ID_LENGTH`].
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        validate_id(&id, ValueObjectError::TipIdEmpty, |actual| {
            ValueObjectError::TipIdTooLong {
                max: MAX_ID_LENGTH,
                actual,
            }
        })?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for TipId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for TipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier value object.
///
/// Always comes from the verified identity bound at connection time, never
/// from a frame payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId.
    ///
    /// # Errors
    ///
    /// Fails if the id is empty or longer than [`MAX_ID_LENGTH`].
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        validate_id(&id, ValueObjectError::UserIdEmpty, |actual| {
            ValueObjectError::UserIdTooLong {
                max: MAX_ID_LENGTH,
                actual,
            }
        })?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message content value object.
///
/// Represents the content of a chat message with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create a new MessageContent.
    ///
    /// # Arguments
    ///
    /// * `content` - The message content string
    ///
    /// # Returns
    ///
    /// A Result containing the MessageContent or an error if validation fails
    pub fn new(content: String) -> Result<Self, ValueObjectError> {
        if content.is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let len = content.chars().count();
        if len > MAX_CONTENT_LENGTH {
            return Err(ValueObjectError::MessageContentTooLong {
                max: MAX_CONTENT_LENGTH,
                actual: len,
            });
        }
        Ok(Self(content))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
