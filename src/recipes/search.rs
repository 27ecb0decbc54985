use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;

use super::embedding_to_bytes;
use super::store::{recipe_from_row, RECIPE_COLUMNS};
use super::types::Recipe;

/// A recipe matched by a query, with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeHit {
    pub recipe: Recipe,
    pub similarity: f64,
}

/// Largest `k` a sqlite-vec KNN query accepts.
pub const MAX_KNN_RESULTS: usize = 4096;

/// Search knobs, taken from `[retrieval]` in the config.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub max_results: usize,
    pub min_similarity: f64,
}

impl From<&crate::config::RetrievalConfig> for SearchParams {
    fn from(config: &crate::config::RetrievalConfig) -> Self {
        Self {
            max_results: config.max_results,
            min_similarity: config.min_similarity,
        }
    }
}

/// Nearest recipes to `query_embedding`, most similar first.
///
/// Candidates below `min_similarity` are dropped, so an unrelated query (or an
/// empty store) yields no hits.
pub fn search_recipes(
    conn: &Connection,
    query_embedding: &[f32],
    params: &SearchParams,
) -> Result<Vec<RecipeHit>> {
    if params.max_results == 0 {
        return Ok(vec![]);
    }

    let max_distance = cosine_threshold_to_l2(params.min_similarity);
    let limit = params.max_results.min(MAX_KNN_RESULTS);
    let neighbours: Vec<(String, f64)> = vector_search(conn, query_embedding, limit)?
        .into_iter()
        .take_while(|(_, distance)| *distance <= max_distance)
        .collect();

    let ids: Vec<&str> = neighbours.iter().map(|(id, _)| id.as_str()).collect();
    let mut recipes = fetch_recipes(conn, &ids)?;

    let hits = neighbours
        .iter()
        .filter_map(|(id, distance)| {
            recipes.remove(id).map(|recipe| RecipeHit {
                recipe,
                similarity: l2_to_cosine(*distance),
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(hits = hits.len(), max_distance, "recipe search finished");
    Ok(hits)
}

/// L2 distance between unit vectors whose cosine similarity is `similarity`.
pub fn cosine_threshold_to_l2(similarity: f64) -> f64 {
    (2.0 - 2.0 * similarity.clamp(-1.0, 1.0)).sqrt()
}

fn l2_to_cosine(distance: f64) -> f64 {
    1.0 - distance * distance / 2.0
}

/// Vector KNN search via sqlite-vec, nearest first.
fn vector_search(conn: &Connection, embedding: &[f32], limit: usize) -> Result<Vec<(String, f64)>> {
    let mut stmt = conn.prepare(
        "SELECT id, distance FROM recipes_vec \
         WHERE embedding MATCH ?1 ORDER BY distance LIMIT ?2",
    )?;
    let results = stmt
        .query_map(params![embedding_to_bytes(embedding), limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(results)
}

fn fetch_recipes(conn: &Connection, ids: &[&str]) -> Result<HashMap<String, Recipe>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id IN ({placeholders})"
    ))?;
    let recipes = stmt
        .query_map(rusqlite::params_from_iter(ids), recipe_from_row)?
        .map(|r| r.map(|recipe| (recipe.id.clone(), recipe)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(recipes)
}
