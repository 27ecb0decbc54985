//! Chat web server.
//!
//! One [`AssistantSession`] is built at startup and shared behind a
//! `tokio::sync::Mutex`, so concurrent requests are answered one at a time
//! against the same conversation. The server also keeps the display
//! transcript the page renders; it records what the user saw, fallback
//! notice included, and can diverge from the session history.

pub mod frontend;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::assistant::prompt::PromptTemplate;
use crate::assistant::AssistantSession;
use crate::config::LarderConfig;
use crate::error::AssistantError;
use crate::recipes::retriever::RecipeRetriever;
use crate::recipes::search::SearchParams;
use crate::{db, embedding, llm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the display transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

pub struct AppState {
    assistant: Mutex<AssistantSession>,
    transcript: Mutex<Vec<ChatMessage>>,
}

impl AppState {
    pub fn new(assistant: AssistantSession) -> Self {
        Self {
            assistant: Mutex::new(assistant),
            transcript: Mutex::new(Vec::new()),
        }
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// JSON error body with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Open the store, load the embedding model and the language model, and wire
/// them into a fresh session.
pub fn build_assistant(config: &LarderConfig) -> Result<AssistantSession> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");
    warn_on_model_mismatch(&conn, &config.embedding.model);

    let provider = embedding::create_provider(&config.embedding)?;
    let embedding: Arc<dyn embedding::EmbeddingProvider> = Arc::from(provider);
    tracing::info!("embedding provider ready");

    let retriever = RecipeRetriever::new(
        Arc::new(std::sync::Mutex::new(conn)),
        embedding,
        SearchParams::from(&config.retrieval),
    );
    let model = llm::create_model(&config.llm)?;
    let template = PromptTemplate::from_config(&config.assistant)?;

    Ok(AssistantSession::new(Arc::new(retriever), model, template))
}

fn warn_on_model_mismatch(conn: &Connection, configured: &str) {
    if let Some(stored) = stored_model_mismatch(conn, configured) {
        warn!(
            stored = %stored,
            configured = %configured,
            "embedding model changed — run `larder re-embed` to update all vectors"
        );
    }
}

/// The recorded model, when one is recorded and differs from `configured`.
fn stored_model_mismatch(conn: &Connection, configured: &str) -> Option<String> {
    db::migrations::get_embedding_model(conn)
        .ok()
        .flatten()
        .filter(|stored| stored != configured)
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/messages", get(list_messages).delete(clear_messages))
        .route("/api/chat", post(chat_handler))
        .merge(frontend::frontend_router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_messages(State(state): State<SharedState>) -> Json<Vec<ChatMessage>> {
    Json(state.transcript.lock().await.clone())
}

async fn clear_messages(State(state): State<SharedState>) -> StatusCode {
    state.transcript.lock().await.clear();
    StatusCode::NO_CONTENT
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    // Held for the whole turn so the transcript interleaves like the session history.
    let mut assistant = state.assistant.lock().await;

    state.transcript.lock().await.push(ChatMessage {
        role: Role::User,
        content: request.message.clone(),
    });

    let response = assistant.query(&request.message).await.map_err(|e| {
        error!(error = %e, "chat turn failed");
        ApiError::from(e)
    })?;

    state.transcript.lock().await.push(ChatMessage {
        role: Role::Assistant,
        content: response.clone(),
    });

    Ok(Json(ChatResponse { response }))
}

/// Serve the chat UI and API until Ctrl-C.
pub async fn serve(config: LarderConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let assistant = build_assistant(&config)?;
    let router = build_router(Arc::new(AppState::new(assistant)));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "chat UI listening at http://{bind_addr}/");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            info!("shutting down chat server");
        })
        .await?;

    Ok(())
}
