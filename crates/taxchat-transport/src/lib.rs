//! Transport layer for the tax chat service.
//!
//! Provides:
//! - Wire protocol (JSON request/response bodies)
//! - HTTP router and error mapping (feature: http)
//! - CORS policy (feature: http)

pub mod protocol;

#[cfg(feature = "http")]
pub mod cors;
#[cfg(feature = "http")]
pub mod http;

pub use protocol::{ChatRequest, ChatResponse};

#[cfg(feature = "http")]
pub use cors::AllowedOrigins;
#[cfg(feature = "http")]
pub use http::{API_PREFIX, ApiInfo, HttpState, create_router};
