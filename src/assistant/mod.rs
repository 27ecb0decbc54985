//! The conversational core: one [`AssistantSession`] per conversation.
//!
//! A session owns the conversation history and the documents retrieved for
//! the latest query. Each [`AssistantSession::query`] call retrieves, builds a
//! prompt, asks the language model, records the turn and applies the
//! fallback notice when nothing was retrieved.
//!
//! The two collaborators are injected as trait objects:
//! [`crate::recipes::retriever::RecipeRetriever`] and
//! [`crate::llm::openai::OpenAiChatModel`] in the application, stubs in tests.

pub mod prompt;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AssistantError, GenerationError, RetrievalError};
use prompt::{build_prompt, PromptTemplate};

/// Appended to the returned response when retrieval found no recipes.
pub const FALLBACK_NOTICE: &str =
    "\n\nMy database is hungry for more recipes. Can you provide additional context or ingredients?";

/// Fetches documents relevant to a query, most relevant first.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, RetrievalError>;
}

/// Produces a single completion for a fully assembled prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn call(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// One completed exchange. The response is the raw model output, without the
/// fallback notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub query: String,
    pub response: String,
}

pub struct AssistantSession {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn LanguageModel>,
    template: PromptTemplate,
    history: Vec<Turn>,
    documents: Vec<String>,
    last_prompt: Option<String>,
}

impl AssistantSession {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        model: Arc<dyn LanguageModel>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            retriever,
            model,
            template,
            history: Vec::new(),
            documents: Vec::new(),
            last_prompt: None,
        }
    }

    /// Run one conversational turn.
    ///
    /// History only grows when both retrieval and generation succeed; on
    /// failure the error is returned as-is and the turn is not recorded.
    pub async fn query(&mut self, text: &str) -> Result<String, AssistantError> {
        let turn_number = self.history.len() + 1;
        info!(turn = turn_number, query_len = text.len(), "assistant query");

        self.documents = self.retriever.retrieve(text).await?;
        debug!(documents = self.documents.len(), "retrieval finished");

        let prompt = build_prompt(&self.template, &self.history, &self.documents, text);
        let prompt = self.last_prompt.insert(prompt);

        let response = self.model.call(prompt).await?;
        info!(
            turn = turn_number,
            response_len = response.len(),
            documents = self.documents.len(),
            "assistant response generated"
        );

        self.history.push(Turn {
            query: text.to_string(),
            response: response.clone(),
        });

        if self.documents.is_empty() {
            return Ok(response + FALLBACK_NOTICE);
        }
        Ok(response)
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Documents retrieved for the most recent query.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// The prompt sent for the most recent query, if any.
    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }
}
