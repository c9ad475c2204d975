//! HTTP API for the chat service.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use taxchat_session::{ChatError, ChatService};
use tower_http::trace::TraceLayer;

use crate::{
    cors::AllowedOrigins,
    protocol::{
        ChatRequest, ChatResponse, ErrorResponse, FieldError, HealthResponse, MessageResponse,
        RootResponse, SessionHistoryResponse, ValidationErrorResponse,
    },
};

/// Prefix all chat routes are mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Detail returned for any failed chat turn.
const CHAT_FAILED: &str = "Error processing chat request";

/// Descriptive metadata reported by the API.
#[derive(Debug, Clone)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            title: "Nigerian Tax Reform AI Chatbot (2026)".to_string(),
            version: "1.0.0".to_string(),
            description: "AI-powered chatbot to help Nigerian taxpayers understand the 2026 tax reforms and calculate tax obligations".to_string(),
        }
    }
}

/// Handler state.
#[derive(Clone)]
pub struct HttpState {
    pub chat: Arc<ChatService>,
    pub info: Arc<ApiInfo>,
}

impl HttpState {
    /// Create new handler state.
    #[must_use]
    pub fn new(chat: Arc<ChatService>, info: ApiInfo) -> Self {
        Self {
            chat,
            info: Arc::new(info),
        }
    }
}

/// API error mapped onto an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Request failed validation.
    Validation {
        status: StatusCode,
        errors: Vec<FieldError>,
    },
    /// Unknown session.
    NotFound(String),
    /// Anything else; the detail is deliberately opaque.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { status, errors } => {
                (status, Json(ValidationErrorResponse { detail: errors })).into_response()
            }
            Self::NotFound(detail) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { detail })).into_response()
            }
            Self::Internal(detail) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail })).into_response()
            }
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::NotFound(id) => Self::NotFound(format!("Session {id} not found")),
            ChatError::Upstream(_) => Self::Internal(CHAT_FAILED.to_string()),
            ChatError::Storage(e) => {
                tracing::error!(error = %e, "Session store failed");
                Self::Internal(CHAT_FAILED.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "json_invalid_data",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "missing_content_type",
            _ => "invalid_body",
        };
        Self::Validation {
            status: rejection.status(),
            errors: vec![FieldError::body("", rejection.body_text(), kind)],
        }
    }
}

async fn root_handler(State(state): State<HttpState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to {} API", state.info.title),
        version: state.info.version.clone(),
        docs: API_PREFIX.to_string(),
    })
}

async fn health_handler(State(state): State<HttpState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: format!("{} is running", state.info.title),
    })
}

async fn chat_handler(
    State(state): State<HttpState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|errors| ApiError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            errors,
        })?;

    let reply = state
        .chat
        .chat(&request.message, request.session_id())
        .await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        session_id: reply.session_id,
        timestamp: reply.timestamp,
    }))
}

async fn get_session_handler(
    State(state): State<HttpState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionHistoryResponse>, ApiError> {
    let history = state.chat.history(&session_id).await?;
    Ok(Json(SessionHistoryResponse {
        session_id,
        history,
    }))
}

async fn clear_session_handler(
    State(state): State<HttpState>,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.chat.clear(&session_id).await?;
    Ok(Json(MessageResponse {
        message: format!("Session {session_id} cleared successfully"),
    }))
}

/// Chat routes, relative to [`API_PREFIX`].
pub fn api_routes() -> Router<HttpState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route(
            "/chat/session/{session_id}",
            get(get_session_handler).delete(clear_session_handler),
        )
}

/// Create the full application router.
///
/// # Example
/// ```ignore
/// let app = create_router(state, &AllowedOrigins::Any);
/// axum::serve(listener, app).await?;
/// ```
#[must_use]
pub fn create_router(state: HttpState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest(API_PREFIX, api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(origins.layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, header},
    };
    use serde_json::{Value, json};
    use taxchat_core::{Message, ModelClient, ModelError, PromptAssembler, Role};
    use taxchat_session::storage::MemorySessionStore;
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct MockModel {
        calls: Mutex<Vec<Vec<Message>>>,
        fail: Mutex<bool>,
    }

    #[async_trait]
    impl ModelClient for MockModel {
        async fn generate(&self, messages: &[Message]) -> Result<String, ModelError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages.to_vec());
            if *self.fail.lock().unwrap() {
                return Err(ModelError::Http("connection reset by peer".to_string()));
            }
            Ok(format!("mocked reply {}", calls.len()))
        }
    }

    fn app() -> (Router, Arc<MockModel>) {
        let model = Arc::new(MockModel::default());
        let chat = ChatService::new(
            Arc::new(MemorySessionStore::new()),
            Arc::clone(&model) as Arc<dyn ModelClient>,
            PromptAssembler::new("You are a tax assistant."),
        );
        let state = HttpState::new(Arc::new(chat), ApiInfo::default());
        (create_router(state, &AllowedOrigins::Any), model)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn chat(app: &Router, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, "/api/v1/chat", Some(body)).await
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["message"].as_str().unwrap().ends_with("is running"));
    }

    #[tokio::test]
    async fn test_root() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::GET, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["docs"], API_PREFIX);
    }

    #[tokio::test]
    async fn test_chat_issues_fresh_session_ids() {
        let (app, _) = app();

        let (status, first) = chat(&app, json!({ "message": "Hello" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["response"], "mocked reply 1");
        assert!(!first["session_id"].as_str().unwrap().is_empty());
        assert!(first["timestamp"].is_string());

        let (_, second) = chat(&app, json!({ "message": "Hello" })).await;
        assert_ne!(first["session_id"], second["session_id"]);
    }

    #[tokio::test]
    async fn test_follow_up_scenario() {
        let (app, model) = app();

        let (_, first) = chat(&app, json!({ "message": "Hello" })).await;
        let session_id = first["session_id"].as_str().unwrap().to_string();

        let (status, second) = chat(
            &app,
            json!({ "message": "Follow-up", "session_id": session_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["session_id"], session_id.as_str());

        let calls = model.calls.lock().unwrap().clone();
        let sent: Vec<_> = calls[1]
            .iter()
            .map(|m| (m.role(), m.content().to_string()))
            .collect();
        assert_eq!(
            sent,
            vec![
                (Role::System, "You are a tax assistant.".to_string()),
                (Role::User, "Hello".to_string()),
                (Role::Assistant, "mocked reply 1".to_string()),
                (Role::User, "Follow-up".to_string()),
            ]
        );

        let uri = format!("/api/v1/chat/session/{session_id}");
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], session_id.as_str());
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0]["role"], "user");
        assert_eq!(history[0]["content"], "Hello");
        assert_eq!(history[3]["role"], "assistant");
        assert_eq!(history[3]["content"], "mocked reply 2");
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (app, model) = app();
        let (status, body) = chat(&app, json!({ "message": "" })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"], json!(["body", "message"]));
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_message_rejected() {
        let (app, _) = app();
        let (status, body) = chat(&app, json!({ "session_id": "abc" })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["type"], "json_invalid_data");
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/chat/session/never-used", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Session never-used not found");
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (app, _) = app();
        let (_, first) = chat(&app, json!({ "message": "Hello" })).await;
        let uri = format!(
            "/api/v1/chat/session/{}",
            first["session_id"].as_str().unwrap()
        );

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().ends_with("cleared successfully"));

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_model_failure_is_opaque_and_records_nothing() {
        let (app, model) = app();
        let (_, first) = chat(&app, json!({ "message": "Hello" })).await;
        let session_id = first["session_id"].as_str().unwrap().to_string();

        *model.fail.lock().unwrap() = true;
        let (status, body) = chat(
            &app,
            json!({ "message": "Again", "session_id": session_id }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], CHAT_FAILED);

        let uri = format!("/api/v1/chat/session/{session_id}");
        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body["history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cors_list_allows_configured_origin() {
        let model = Arc::new(MockModel::default());
        let chat = ChatService::new(
            Arc::new(MemorySessionStore::new()),
            model as Arc<dyn ModelClient>,
            PromptAssembler::default(),
        );
        let origins = AllowedOrigins::parse("http://localhost:3000").unwrap();
        let app = create_router(HttpState::new(Arc::new(chat), ApiInfo::default()), &origins);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/chat")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
    }
}
