//! Google Gemini model client and wire protocol.

pub mod client;
pub mod protocol;

pub use client::{DEFAULT_BASE_URL, GeminiClient, GeminiConfig};
