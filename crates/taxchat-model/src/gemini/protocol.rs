//! Gemini `generateContent` wire types.

use serde::{Deserialize, Serialize};
use taxchat_core::{Message, ModelError, Role};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

/// A role-tagged list of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_owned),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerateContentRequest {
    /// Translate an ordered message sequence into a Gemini request.
    ///
    /// System messages become the system instruction; assistant turns use the
    /// `model` role.
    ///
    /// # Errors
    /// Returns error if there is no user or assistant message to send.
    pub fn from_messages(
        messages: &[Message],
        generation_config: GenerationConfig,
    ) -> Result<Self, ModelError> {
        let mut system = Vec::new();
        let mut contents = Vec::with_capacity(messages.len());

        for msg in messages {
            match msg.role() {
                Role::System => system.push(msg.content()),
                Role::User => contents.push(Content::text(Some("user"), msg.content())),
                Role::Assistant => contents.push(Content::text(Some("model"), msg.content())),
            }
        }

        if contents.is_empty() {
            return Err(ModelError::InvalidRequest(
                "no conversation messages to send".to_string(),
            ));
        }

        let system_instruction =
            (!system.is_empty()).then(|| Content::text(None, system.join("\n\n")));

        Ok(Self {
            contents,
            system_instruction,
            generation_config,
        })
    }
}

/// Response body of `generateContent`.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    ///
    /// # Errors
    /// Returns error if the first candidate carries no text.
    pub fn into_text(self) -> Result<String, ModelError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(ModelError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub status: Option<String>,
}

/// Best-effort human readable message from an error response body.
#[must_use]
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let message = error.message.unwrap_or_else(|| body.to_string());
            match error.status {
                Some(status) if !status.is_empty() => format!("{status}: {message}"),
                _ => message,
            }
        }
        Err(_) => body.to_string(),
    }
}
