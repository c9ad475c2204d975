//! Cross-origin policy.

use axum::http::{HeaderValue, header::InvalidHeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};

/// Origins allowed to call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `*`: any origin.
    Any,
    /// An explicit origin list.
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parse `*` or a comma-separated list of origins.
    ///
    /// # Errors
    /// Returns error if an origin is not a valid header value.
    pub fn parse(raw: &str) -> Result<Self, InvalidHeaderValue> {
        let origins: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() || origins.contains(&"*") {
            return Ok(Self::Any);
        }
        let origins = origins
            .into_iter()
            .map(HeaderValue::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::List(origins))
    }

    /// Build the CORS layer.
    ///
    /// Credentials cannot be combined with wildcards, so the wildcard policy
    /// never allows them and the list policy mirrors the request's method and
    /// headers instead.
    #[must_use]
    pub fn layer(&self) -> CorsLayer {
        match self {
            Self::Any => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
            Self::List(origins) => CorsLayer::new()
                .allow_origin(origins.clone())
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        }
    }
}
