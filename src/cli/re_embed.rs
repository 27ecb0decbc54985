//! CLI `re-embed` command — regenerate every recipe vector with the current model.

use anyhow::{Context, Result};
use std::sync::Arc;

use larder::config::LarderConfig;
use larder::db;
use larder::recipes::store::{list_recipes, replace_embedding};

const BATCH_SIZE: usize = 32;

pub async fn re_embed(config: &LarderConfig) -> Result<()> {
    let conn = super::open_db(config).context("failed to open database")?;
    let provider = super::load_embedder(config)?;

    let recipes = list_recipes(&conn)?;
    let total = recipes.len();
    if total == 0 {
        println!("No recipes to re-embed.");
        return Ok(());
    }

    println!("Re-embedding {total} recipes with model '{}'...", config.embedding.model);
    let pb = super::progress_bar(total as u64, "  {bar:40.cyan/blue} {pos}/{len} ({eta})");

    for chunk in recipes.chunks(BATCH_SIZE) {
        // same text `import` embedded
        let texts: Vec<String> = chunk.iter().map(|r| r.as_document()).collect();
        let provider = Arc::clone(&provider);

        let embeddings = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            provider.embed_batch(&refs)
        })
        .await?
        .context("embedding batch failed")?;

        for (recipe, embedding) in chunk.iter().zip(&embeddings) {
            replace_embedding(&conn, &recipe.id, embedding)?;
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    db::migrations::set_embedding_model(&conn, &config.embedding.model)?;

    println!("Re-embedded {total} recipes with model '{}'.", config.embedding.model);
    Ok(())
}
