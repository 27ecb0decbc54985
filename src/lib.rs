//! Larder: a cooking assistant that answers from your own recipe collection.
//!
//! Every user query goes through the same turn:
//!
//! 1. the query is embedded and the nearest stored recipes are retrieved,
//! 2. a prompt is assembled from a fixed persona, worked example dialogues,
//!    the conversation so far, the retrieved recipes and the query,
//! 3. a chat-completion model answers it,
//! 4. the turn is recorded, and when no recipe matched, a notice asking for
//!    more context is appended to the answer.
//!
//! # Architecture
//!
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for nearest-neighbour search over recipe vectors
//! - **Embeddings**: Local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions)
//! - **Generation**: any OpenAI-compatible `/chat/completions` endpoint
//! - **Front ends**: a small web chat UI served by axum, and a terminal REPL
//!
//! # Modules
//!
//! - [`assistant`] — Conversation session, prompt assembly, retriever and model seams
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, migrations, and health checks
//! - [`embedding`] — Text-to-vector embedding pipeline via ONNX Runtime
//! - [`error`] — Retrieval and generation failure types
//! - [`llm`] — Chat-completion client
//! - [`recipes`] — Recipe store, vector search, and the store-backed retriever
//! - [`server`] — Web chat UI and JSON API

pub mod assistant;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod recipes;
pub mod server;
