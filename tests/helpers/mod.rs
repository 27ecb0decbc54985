#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use larder::assistant::LanguageModel;
use larder::db;
use larder::embedding::{EmbeddingProvider, EMBEDDING_DIM};
use larder::error::GenerationError;
use larder::recipes::store::add_recipe;
use larder::recipes::types::NewRecipe;
use rusqlite::Connection;
use std::sync::Mutex;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Generate a deterministic 384-dim embedding with a spike at position `seed`.
/// Distinct seeds give orthogonal vectors.
pub fn test_embedding(seed: u16) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed as usize % EMBEDDING_DIM] = 1.0;
    v
}

/// Generate an embedding with high cosine similarity to `base`.
pub fn similar_embedding(base: &[f32]) -> Vec<f32> {
    let mut v = base.to_vec();
    for i in 0..5 {
        v[(i * 37 + 3) % EMBEDDING_DIM] += 0.05;
    }
    normalize(&mut v);
    v
}

fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Store a recipe with the given embedding. Returns its id.
pub fn insert_recipe(conn: &mut Connection, title: &str, content: &str, embedding: &[f32]) -> String {
    add_recipe(conn, &NewRecipe::new(title, content), embedding)
        .unwrap()
        .id()
        .to_string()
}

/// Embeds by keyword: every listed keyword found in the text adds a spike at
/// its dimension. Text with no keyword lands on the last dimension.
pub struct KeywordEmbedder {
    keywords: Vec<(&'static str, u16)>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[(&'static str, u16)]) -> Self {
        Self {
            keywords: keywords.to_vec(),
        }
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.to_lowercase();
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        for (keyword, dim) in &self.keywords {
            if text.contains(keyword) {
                v[*dim as usize] += 1.0;
            }
        }
        if v.iter().all(|x| *x == 0.0) {
            v[EMBEDDING_DIM - 1] = 1.0;
        }
        normalize(&mut v);
        Ok(v)
    }
}

/// Replies with a fixed answer and records every prompt it receives.
pub struct RecordingModel {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    async fn call(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}
