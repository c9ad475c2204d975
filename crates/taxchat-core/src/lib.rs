//! Core abstractions for the tax chat service.
//!
//! This crate provides the fundamental building blocks:
//! - `Message` / `Transcript` - Conversation data model
//! - `PromptAssembler` - System prompt + history + new message
//! - `SessionStore` and `ModelClient` traits

pub mod message;
pub mod prompt;
pub mod traits;

pub use message::{Message, Role, Transcript};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, PromptAssembler};
pub use traits::{ModelClient, ModelError, SessionKey, SessionStore, StorageError, new_session_key};
