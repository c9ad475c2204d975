//! Chat service orchestrating one turn of conversation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use taxchat_core::{
    Message, PromptAssembler, Role, Transcript,
    traits::{ModelClient, ModelError, SessionKey, SessionStore, StorageError},
};

/// Chat service error.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Model error: {0}")]
    Upstream(#[from] ModelError),
    #[error("Session {0} not found")]
    NotFound(SessionKey),
}

/// Result of a successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Reply text produced by the model.
    pub response: String,
    /// Session the turn was recorded in.
    pub session_id: SessionKey,
    /// When the reply was received.
    pub timestamp: DateTime<Utc>,
}

/// Chat service tying the session store, prompt assembly and model together.
///
/// Both collaborators are injected so a persistent store or another model
/// backend can be swapped in without touching the HTTP layer.
pub struct ChatService {
    store: Arc<dyn SessionStore>,
    model: Arc<dyn ModelClient>,
    assembler: PromptAssembler,
}

impl ChatService {
    /// Create a new chat service.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        model: Arc<dyn ModelClient>,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            store,
            model,
            assembler,
        }
    }

    /// Run one chat turn.
    ///
    /// The turn is recorded only after the model has answered; a failed model
    /// call leaves the session untouched.
    ///
    /// # Errors
    /// Returns error if the store fails or the model call fails.
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        let (key, transcript) = self.store.resolve_or_create(session_id).await?;
        let user = Message::user(message);
        let outbound = self
            .assembler
            .build_at(&transcript, message, user.timestamp());

        tracing::debug!(session_id = %key, history = transcript.len(), "Sending chat turn");

        let response = match self.model.generate(&outbound).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(session_id = %key, error = %e, "Model call failed");
                return Err(e.into());
            }
        };

        let assistant = Message::new(Role::Assistant, response.clone());
        let timestamp = assistant.timestamp();
        self.store.append_turn(&key, user, assistant).await?;

        Ok(ChatReply {
            response,
            session_id: key,
            timestamp,
        })
    }

    /// Get the transcript of a session.
    ///
    /// # Errors
    /// Returns error if the session does not exist.
    pub async fn history(&self, session_id: &str) -> Result<Transcript, ChatError> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(session_id.to_owned()))
    }

    /// Delete a session.
    ///
    /// # Errors
    /// Returns error if the session does not exist.
    pub async fn clear(&self, session_id: &str) -> Result<(), ChatError> {
        if self.store.clear(session_id).await? {
            Ok(())
        } else {
            Err(ChatError::NotFound(session_id.to_owned()))
        }
    }

    /// Number of live sessions.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub async fn session_count(&self) -> Result<usize, ChatError> {
        Ok(self.store.len().await?)
    }
}
