//! CLI `import` command — load recipes into the store.
//!
//! Accepts either a JSON file shaped like `{"recipes": [{"title", "content", "tags"}]}`
//! (the `export` format) or a directory of `.md` / `.txt` files, one recipe per
//! file with the file stem as its title.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use larder::config::LarderConfig;
use larder::recipes::store::{add_recipe, claim_embedding_model, AddOutcome};
use larder::recipes::types::NewRecipe;

#[derive(Debug, Deserialize)]
struct RecipeFile {
    recipes: Vec<NewRecipe>,
}

/// Recipes read from an import source. Entries without a title or content
/// are counted in `rejected` and left out.
#[derive(Debug, Default)]
pub struct RecipeSource {
    pub recipes: Vec<NewRecipe>,
    pub rejected: u64,
}

impl RecipeSource {
    fn push(&mut self, recipe: NewRecipe, origin: &str) {
        if recipe.title.trim().is_empty() {
            tracing::warn!(origin = %origin, "skipping recipe without a title");
            self.rejected += 1;
        } else if recipe.content.trim().is_empty() {
            tracing::warn!(origin = %origin, title = %recipe.title, "skipping recipe without content");
            self.rejected += 1;
        } else {
            self.recipes.push(recipe);
        }
    }
}

/// Embed and store every recipe found at `path`. Titles already present are skipped.
pub async fn import(config: &LarderConfig, path: &Path) -> Result<()> {
    let source = read_recipe_source(path)?;
    if source.recipes.is_empty() {
        println!("No usable recipes found at {}.", path.display());
        if source.rejected > 0 {
            println!("  Entries rejected: {} (missing title or content)", source.rejected);
        }
        return Ok(());
    }

    let mut conn = super::open_db(config)?;
    claim_embedding_model(&conn, &config.embedding.model)?;
    let embedder = super::load_embedder(config)?;

    let recipes = &source.recipes;
    println!("Importing {} recipe(s)...", recipes.len());
    let pb = super::progress_bar(recipes.len() as u64, "  {bar:40.cyan/blue} {pos}/{len} ({eta})");

    let mut imported = 0u64;
    let mut skipped = 0u64;
    for recipe in recipes {
        let embedding = super::embed_text(&embedder, recipe.embedding_text()).await?;
        match add_recipe(&mut conn, recipe, &embedding)
            .with_context(|| format!("failed to store recipe '{}'", recipe.title))?
        {
            AddOutcome::Added(_) => imported += 1,
            AddOutcome::Skipped(_) => skipped += 1,
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Import complete:");
    println!("  Recipes imported: {imported}");
    println!("  Recipes skipped:  {skipped} (title already stored)");
    println!("  Entries rejected: {} (missing title or content)", source.rejected);
    Ok(())
}

/// Parse recipes from a JSON file or a directory of text files.
pub fn read_recipe_source(path: &Path) -> Result<RecipeSource> {
    if path.is_dir() {
        return read_recipe_dir(path);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read import file: {}", path.display()))?;
    let file: RecipeFile = serde_json::from_str(&json).context("failed to parse recipe JSON")?;

    let mut source = RecipeSource::default();
    for (i, recipe) in file.recipes.into_iter().enumerate() {
        source.push(recipe, &format!("{}#{}", path.display(), i + 1));
    }
    Ok(source)
}

fn read_recipe_dir(dir: &Path) -> Result<RecipeSource> {
    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    let mut source = RecipeSource::default();
    for path in paths {
        let is_text = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("md" | "txt")
        );
        if !path.is_file() || !is_text {
            continue;
        }

        let Some(title) = path.file_stem().and_then(|s| s.to_str()) else {
            bail!("unreadable file name: {}", path.display());
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        source.push(
            NewRecipe::new(title.replace(['_', '-'], " "), content.trim()),
            &path.display().to_string(),
        );
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_json_recipe_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("recipes.json");
        std::fs::write(
            &file,
            r#"{"recipes": [
                {"title": "Omelette", "content": "Eggs, butter.", "tags": ["breakfast"]},
                {"id": "ignored", "title": "Soup", "content": "Water, leeks.", "created_at": "x"}
            ]}"#,
        )
        .unwrap();

        let source = read_recipe_source(&file).unwrap();
        assert_eq!(source.recipes.len(), 2);
        assert_eq!(source.rejected, 0);
        assert_eq!(source.recipes[0].tags, vec!["breakfast"]);
        assert_eq!(source.recipes[1].title, "Soup");
    }

    #[test]
    fn blank_json_entries_are_rejected_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("recipes.json");
        std::fs::write(
            &file,
            r#"{"recipes": [
                {"title": "Omelette", "content": "Eggs, butter."},
                {"title": "  ", "content": "Nameless stew."},
                {"title": "Empty", "content": ""},
                {"title": "Soup", "content": "Water, leeks."}
            ]}"#,
        )
        .unwrap();

        let source = read_recipe_source(&file).unwrap();
        let titles: Vec<&str> = source.recipes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Omelette", "Soup"]);
        assert_eq!(source.rejected, 2);
    }

    #[test]
    fn reads_text_files_from_directory() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("potato_leek-soup.md"), "Leeks and potatoes.\n").unwrap();
        std::fs::write(tmp.path().join("apple pie.txt"), "Apples, pastry.").unwrap();
        std::fs::write(tmp.path().join("notes.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("blank.txt"), "   \n").unwrap();

        let source = read_recipe_source(tmp.path()).unwrap();
        let titles: Vec<&str> = source.recipes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["apple pie", "potato leek soup"]);
        assert_eq!(source.recipes[1].content, "Leeks and potatoes.");
        assert_eq!(source.rejected, 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("bad.json");
        std::fs::write(&file, "[not json").unwrap();
        assert!(read_recipe_source(&file).is_err());
    }
}
