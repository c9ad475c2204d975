//! In-memory session store.

use std::{collections::HashMap, num::NonZeroUsize, sync::RwLock};

use async_trait::async_trait;
use taxchat_core::{
    Message, Transcript,
    traits::{SessionKey, SessionStore, StorageError, new_session_key},
};

/// In-memory session store.
///
/// A single lock guards the whole map; it is never held across an await.
/// Data is lost on restart.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, Transcript>>,
    max_turns: Option<NonZeroUsize>,
}

impl MemorySessionStore {
    /// Create an unbounded in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_turns: None,
        }
    }

    /// Keep at most `max_turns` of the most recent turns per session.
    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: Option<NonZeroUsize>) -> Self {
        self.max_turns = max_turns;
        self
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Internal(e.to_string())
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn resolve_or_create(
        &self,
        key: Option<&str>,
    ) -> Result<(SessionKey, Transcript), StorageError> {
        let sessions = self.sessions.read().map_err(poisoned)?;

        if let Some(key) = key {
            if let Some(transcript) = sessions.get(key) {
                return Ok((key.to_owned(), transcript.clone()));
            }
            tracing::debug!(requested = key, "Unknown session, issuing new key");
        }

        let mut fresh = new_session_key();
        while sessions.contains_key(&fresh) {
            fresh = new_session_key();
        }
        Ok((fresh, Transcript::new()))
    }

    async fn append_turn(
        &self,
        key: &str,
        user: Message,
        assistant: Message,
    ) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;

        let created = !sessions.contains_key(key);
        let transcript = sessions.entry(key.to_owned()).or_default();
        transcript.push(user);
        transcript.push(assistant);

        if let Some(max_turns) = self.max_turns {
            let max_len = max_turns.get().saturating_mul(2);
            if transcript.len() > max_len {
                let excess = transcript.len() - max_len;
                transcript.drain(..excess);
            }
        }

        if created {
            tracing::info!(session_id = key, sessions = sessions.len(), "Session created");
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Transcript>, StorageError> {
        Ok(self.sessions.read().map_err(poisoned)?.get(key).cloned())
    }

    async fn clear(&self, key: &str) -> Result<bool, StorageError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let existed = sessions.remove(key).is_some();
        if existed {
            tracing::info!(session_id = key, sessions = sessions.len(), "Session cleared");
        }
        Ok(existed)
    }

    async fn len(&self) -> Result<usize, StorageError> {
        Ok(self.sessions.read().map_err(poisoned)?.len())
    }
}
