//! Hosted language model clients.
//!
//! Provides:
//! - Gemini `generateContent` protocol types
//! - `GeminiClient`, a `ModelClient` over the Gemini REST API

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};
