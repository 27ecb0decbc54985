use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Summary of what the recipe store holds.
#[derive(Debug, Serialize)]
pub struct RecipeStats {
    pub total_recipes: u64,
    /// Recipes without a vector cannot be retrieved; non-zero means a re-embed is due.
    pub missing_vectors: u64,
    pub by_tag: BTreeMap<String, u64>,
    pub db_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_recipe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_recipe: Option<String>,
}

/// Compute store statistics. `db_path` is only used for the file size; pass
/// `None` for in-memory databases.
pub fn recipe_stats(conn: &Connection, db_path: Option<&Path>) -> Result<RecipeStats> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
    let missing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM recipes WHERE id NOT IN (SELECT id FROM recipes_vec)",
        [],
        |row| row.get(0),
    )?;
    let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM recipes",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(RecipeStats {
        total_recipes: total as u64,
        missing_vectors: missing as u64,
        by_tag: count_by_tag(conn)?,
        db_size_bytes,
        oldest_recipe: oldest,
        newest_recipe: newest,
    })
}

fn count_by_tag(conn: &Connection) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(
        "SELECT j.value, COUNT(*) FROM recipes, json_each(recipes.tags) AS j \
         WHERE recipes.tags IS NOT NULL GROUP BY j.value",
    )?;
    let counts = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::store::add_recipe;
    use crate::recipes::types::NewRecipe;

    fn spike(index: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; crate::embedding::EMBEDDING_DIM];
        v[index] = 1.0;
        v
    }

    #[test]
    fn empty_store_has_zero_counts() {
        let conn = crate::db::open_memory_database().unwrap();
        let stats = recipe_stats(&conn, None).unwrap();
        assert_eq!(stats.total_recipes, 0);
        assert_eq!(stats.missing_vectors, 0);
        assert!(stats.by_tag.is_empty());
        assert!(stats.oldest_recipe.is_none());
    }

    #[test]
    fn counts_recipes_and_tags() {
        let mut conn = crate::db::open_memory_database().unwrap();
        add_recipe(
            &mut conn,
            &NewRecipe::new("Leek soup", "Leeks, potatoes.").with_tags(["winter", "vegetarian"]),
            &spike(0),
        )
        .unwrap();
        add_recipe(
            &mut conn,
            &NewRecipe::new("Roast potatoes", "Potatoes, garlic.").with_tags(["winter"]),
            &spike(1),
        )
        .unwrap();

        let stats = recipe_stats(&conn, None).unwrap();
        assert_eq!(stats.total_recipes, 2);
        assert_eq!(stats.by_tag.get("winter"), Some(&2));
        assert_eq!(stats.by_tag.get("vegetarian"), Some(&1));
        assert!(stats.newest_recipe.is_some());
    }
}
