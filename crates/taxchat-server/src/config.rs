//! Environment-sourced settings.

use std::{num::NonZeroUsize, time::Duration};

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use taxchat_core::{DEFAULT_SYSTEM_PROMPT, PromptAssembler};
use taxchat_model::{GeminiConfig, gemini::DEFAULT_BASE_URL};
use taxchat_transport::{AllowedOrigins, ApiInfo};
use thiserror::Error;

/// Environment variables read into [`Settings`].
const ENV_KEYS: &[&str] = &[
    "GOOGLE_API_KEY",
    "MODEL_NAME",
    "TEMPERATURE",
    "MAX_OUTPUT_TOKENS",
    "CORS_ORIGINS",
    "MODEL_BASE_URL",
    "MODEL_TIMEOUT_SECS",
    "MAX_HISTORY_TURNS",
    "SYSTEM_PROMPT",
    "SERVER_HOST",
    "SERVER_PORT",
    "API_TITLE",
    "API_VERSION",
    "API_DESCRIPTION",
];

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("GOOGLE_API_KEY is required")]
    MissingApiKey,
    #[error("TEMPERATURE must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),
    #[error("MAX_OUTPUT_TOKENS must be greater than 0")]
    InvalidMaxOutputTokens,
    #[error("Invalid CORS_ORIGINS: {0}")]
    InvalidCorsOrigins(String),
}

/// Service settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    pub google_api_key: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// `*` or a comma-separated origin list.
    pub cors_origins: String,
    pub model_base_url: String,
    pub model_timeout_secs: Option<u64>,
    pub max_history_turns: Option<NonZeroUsize>,
    pub system_prompt: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub api_title: String,
    pub api_version: String,
    pub api_description: String,
}

impl Default for Settings {
    fn default() -> Self {
        let info = ApiInfo::default();
        Self {
            google_api_key: String::new(),
            model_name: "gemini-pro".to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
            cors_origins: "*".to_string(),
            model_base_url: DEFAULT_BASE_URL.to_string(),
            model_timeout_secs: None,
            max_history_turns: None,
            system_prompt: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            api_title: info.title,
            api_version: info.version,
            api_description: info.description,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("google_api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("cors_origins", &self.cors_origins)
            .field("model_base_url", &self.model_base_url)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("max_history_turns", &self.max_history_turns)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    /// Returns error if a value is malformed or a constraint is violated.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Defaults overlaid with the known environment variables.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(ENV_KEYS))
    }

    /// Extract and validate settings.
    ///
    /// # Errors
    /// Returns error if a value is malformed or a constraint is violated.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.google_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::InvalidMaxOutputTokens);
        }
        self.allowed_origins()?;
        Ok(())
    }

    /// Parsed CORS policy.
    ///
    /// # Errors
    /// Returns error if an origin is not a valid header value.
    pub fn allowed_origins(&self) -> Result<AllowedOrigins, ConfigError> {
        AllowedOrigins::parse(&self.cors_origins)
            .map_err(|e| ConfigError::InvalidCorsOrigins(e.to_string()))
    }

    /// Socket address to listen on.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    #[must_use]
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.google_api_key.clone(),
            model: self.model_name.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            base_url: self.model_base_url.clone(),
            timeout: self.model_timeout_secs.map(Duration::from_secs),
        }
    }

    #[must_use]
    pub fn prompt_assembler(&self) -> PromptAssembler {
        PromptAssembler::new(
            self.system_prompt
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(DEFAULT_SYSTEM_PROMPT),
        )
    }

    #[must_use]
    pub fn api_info(&self) -> ApiInfo {
        ApiInfo {
            title: self.api_title.clone(),
            version: self.api_version.clone(),
            description: self.api_description.clone(),
        }
    }
}
