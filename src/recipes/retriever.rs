//! The recipe store as the assistant's [`Retriever`].

use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use super::search::{search_recipes, SearchParams};
use crate::assistant::Retriever;
use crate::embedding::EmbeddingProvider;
use crate::error::RetrievalError;

/// Embeds the query and returns the nearest recipes rendered as documents.
pub struct RecipeRetriever {
    db: Arc<Mutex<Connection>>,
    embedding: Arc<dyn EmbeddingProvider>,
    params: SearchParams,
}

impl RecipeRetriever {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        embedding: Arc<dyn EmbeddingProvider>,
        params: SearchParams,
    ) -> Self {
        Self {
            db,
            embedding,
            params,
        }
    }
}

#[async_trait]
impl Retriever for RecipeRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, RetrievalError> {
        // Embedding is CPU-heavy and the store is synchronous: both run off the runtime.
        let provider = Arc::clone(&self.embedding);
        let text = query.to_string();
        let query_embedding = tokio::task::spawn_blocking(move || provider.embed(&text))
            .await
            .map_err(|e| RetrievalError::Task(e.to_string()))?
            .map_err(|e| RetrievalError::Embedding(format!("{e:#}")))?;

        let db = Arc::clone(&self.db);
        let params = self.params;
        let hits = tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            search_recipes(&conn, &query_embedding, &params)
        })
        .await
        .map_err(|e| RetrievalError::Task(e.to_string()))?
        .map_err(|e| RetrievalError::Store(format!("{e:#}")))?;

        tracing::debug!(
            hits = hits.len(),
            titles = ?hits.iter().map(|h| h.recipe.title.as_str()).collect::<Vec<_>>(),
            "recipes retrieved"
        );

        Ok(hits.iter().map(|hit| hit.recipe.as_document()).collect())
    }
}
