//! Write path and direct lookups for recipes.
//!
//! [`add_recipe`] inserts the recipe row and its vector in one transaction so
//! the two tables never disagree about which recipes exist.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::embedding_to_bytes;
use super::types::{NewRecipe, Recipe};
use crate::db::migrations::{get_embedding_model, set_embedding_model};
use crate::embedding::EMBEDDING_DIM;

/// What [`add_recipe`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "id", rename_all = "snake_case")]
pub enum AddOutcome {
    /// A new recipe was stored under this id.
    Added(String),
    /// A recipe with the same title already exists under this id.
    Skipped(String),
}

impl AddOutcome {
    pub fn id(&self) -> &str {
        match self {
            Self::Added(id) | Self::Skipped(id) => id,
        }
    }
}

pub(crate) const RECIPE_COLUMNS: &str = "id, title, content, tags, created_at";

/// Store a recipe and its embedding. Titles are unique; a repeat title is skipped.
pub fn add_recipe(conn: &mut Connection, recipe: &NewRecipe, embedding: &[f32]) -> Result<AddOutcome> {
    anyhow::ensure!(!recipe.title.trim().is_empty(), "recipe title must not be empty");
    anyhow::ensure!(
        embedding.len() == EMBEDDING_DIM,
        "embedding has {} dimensions, expected {EMBEDDING_DIM}",
        embedding.len()
    );

    let tx = conn.transaction()?;

    if let Some(existing) = find_id_by_title(&tx, &recipe.title)? {
        tracing::debug!(title = %recipe.title, id = %existing, "recipe already stored");
        return Ok(AddOutcome::Skipped(existing));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let tags = serde_json::to_string(&recipe.tags)?;

    tx.execute(
        "INSERT INTO recipes (id, title, content, tags, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, recipe.title, recipe.content, tags, now],
    )?;
    tx.execute(
        "INSERT INTO recipes_vec (id, embedding) VALUES (?1, ?2)",
        params![id, embedding_to_bytes(embedding)],
    )?;

    tx.commit()?;
    tracing::info!(id = %id, title = %recipe.title, "recipe stored");

    Ok(AddOutcome::Added(id))
}

/// Replace the stored vector of an existing recipe.
pub fn replace_embedding(conn: &Connection, id: &str, embedding: &[f32]) -> Result<()> {
    conn.execute("DELETE FROM recipes_vec WHERE id = ?1", [id])?;
    conn.execute(
        "INSERT INTO recipes_vec (id, embedding) VALUES (?1, ?2)",
        params![id, embedding_to_bytes(embedding)],
    )?;
    Ok(())
}

/// Delete a recipe and its vector. Returns `false` if no such recipe exists.
pub fn remove_recipe(conn: &mut Connection, id: &str) -> Result<bool> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM recipes_vec WHERE id = ?1", [id])?;
    let rows = tx.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
    tx.commit()?;

    if rows > 0 {
        tracing::info!(id = %id, "recipe removed");
    }
    Ok(rows > 0)
}

/// Delete every recipe and vector. The recorded embedding model goes with them.
pub fn clear_recipes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM recipes_vec;
         DELETE FROM recipes;
         DELETE FROM schema_meta WHERE key = 'embedding_model';",
    )?;
    Ok(())
}

/// Make sure new vectors from `model` can join the store.
///
/// An empty store adopts `model`. A store whose vectors came from another
/// model is refused until it is re-embedded.
pub fn claim_embedding_model(conn: &Connection, model: &str) -> Result<()> {
    match get_embedding_model(conn)? {
        Some(stored) if stored == model => Ok(()),
        Some(stored) if recipe_count(conn)? > 0 => anyhow::bail!(
            "stored recipes were embedded with '{stored}' but '{model}' is configured; \
             run `larder re-embed` first"
        ),
        _ => {
            set_embedding_model(conn, model)?;
            tracing::info!(model = %model, "embedding model recorded");
            Ok(())
        }
    }
}

fn recipe_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?)
}

pub fn get_recipe(conn: &Connection, id: &str) -> Result<Option<Recipe>> {
    conn.query_row(
        &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"),
        [id],
        recipe_from_row,
    )
    .optional()
    .context("failed to load recipe")
}

/// All recipes, oldest first.
pub fn list_recipes(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY created_at, id"
    ))?;
    let recipes = stmt
        .query_map([], recipe_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recipes)
}

fn find_id_by_title(conn: &Connection, title: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row("SELECT id FROM recipes WHERE title = ?1", [title], |row| row.get(0))
        .optional()?)
}

/// Map a row selected with [`RECIPE_COLUMNS`] to a [`Recipe`].
pub(crate) fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    let tags: Option<String> = row.get(3)?;
    Ok(Recipe {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        tags: tags
            .and_then(|t| serde_json::from_str(&t).ok())
            .unwrap_or_default(),
        created_at: row.get(4)?,
    })
}
