//! Core traits for session storage and model access.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::message::{Message, Transcript};

/// Opaque session identifier.
pub type SessionKey = String;

/// Generate a fresh session key.
#[must_use]
pub fn new_session_key() -> SessionKey {
    Uuid::new_v4().to_string()
}

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    NotFound(SessionKey),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Trait for session transcript stores.
///
/// One instance lives for the whole process and is shared by all request
/// handlers, so implementations must serialize mutations per key at minimum.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up `key`, or hand out a fresh key with an empty transcript when it
    /// is absent or unknown.
    ///
    /// A fresh key is not stored until its first turn is appended.
    async fn resolve_or_create(
        &self,
        key: Option<&str>,
    ) -> Result<(SessionKey, Transcript), StorageError>;

    /// Append one user/assistant pair as a single atomic step.
    ///
    /// Creates the transcript if it does not exist.
    async fn append_turn(
        &self,
        key: &str,
        user: Message,
        assistant: Message,
    ) -> Result<(), StorageError>;

    /// Snapshot of a session's transcript.
    async fn get(&self, key: &str) -> Result<Option<Transcript>, StorageError>;

    /// Remove a session. Returns whether it existed.
    async fn clear(&self, key: &str) -> Result<bool, StorageError>;

    /// Number of live sessions.
    async fn len(&self) -> Result<usize, StorageError>;
}

/// Model call error.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Model returned no text")]
    EmptyResponse,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Trait for hosted language models.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a reply for an ordered message sequence.
    async fn generate(&self, messages: &[Message]) -> Result<String, ModelError>;
}
