//! Session orchestration and storage for the tax chat service.
//!
//! Provides:
//! - `ChatService` - Run chat turns against a store and a model
//! - Storage implementations (memory)

pub mod manager;
pub mod storage;

pub use manager::{ChatError, ChatReply, ChatService};
