//! Wire protocol for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taxchat_core::Message;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User's message; must not be empty.
    pub message: String,
    /// Session to continue, if any.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Check field constraints.
    ///
    /// # Errors
    /// Returns the offending fields.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.message.is_empty() {
            return Err(vec![FieldError::body(
                "message",
                "String should have at least 1 character",
                "string_too_short",
            )]);
        }
        Ok(())
    }

    /// Session id to continue, treating an empty id as absent.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Body returned by `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body returned by `GET /chat/session/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistoryResponse {
    pub session_id: String,
    pub history: Vec<Message>,
}

/// Plain message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body returned by `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

/// Error body with a single description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Error body listing invalid fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub detail: Vec<FieldError>,
}

/// One invalid request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Location of the field, e.g. `["body", "message"]`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Error located in the request body.
    #[must_use]
    pub fn body(field: &str, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        let mut loc = vec!["body".to_string()];
        if !field.is_empty() {
            loc.push(field.to_string());
        }
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_optional_session() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"Hi"}"#).unwrap();
        assert_eq!(req.session_id(), None);
        assert!(req.validate().is_ok());

        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"Hi","session_id":""}"#).unwrap();
        assert_eq!(req.session_id(), None);
    }

    #[test]
    fn test_empty_message_rejected() {
        let req = ChatRequest {
            message: String::new(),
            session_id: None,
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].loc, ["body", "message"]);
        assert_eq!(errors[0].kind, "string_too_short");
    }

    #[test]
    fn test_field_error_serializes_type() {
        let json = serde_json::to_value(FieldError::body("message", "bad", "missing")).unwrap();
        assert_eq!(json["type"], "missing");
        assert!(json.get("kind").is_none());
    }
}
