use anyhow::Result;

use larder::config::LarderConfig;
use larder::recipes::search::{search_recipes, SearchParams};

/// Show which recipes a query would put into the prompt.
pub async fn search(config: &LarderConfig, query: &str, limit: Option<usize>) -> Result<()> {
    let conn = super::open_db(config)?;
    let embedder = super::load_embedder(config)?;
    let query_embedding = super::embed_text(&embedder, query.to_string()).await?;

    let mut params = SearchParams::from(&config.retrieval);
    if let Some(limit) = limit {
        params.max_results = limit;
    }

    let hits = search_recipes(&conn, &query_embedding, &params)?;
    if hits.is_empty() {
        println!(
            "No recipes above similarity {:.2}. The assistant would answer with the fallback notice.",
            params.min_similarity
        );
        return Ok(());
    }

    println!("Found {} recipe(s)\n", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "  {}. {} ({}) similarity {:.3}",
            i + 1,
            hit.recipe.title,
            hit.recipe.id,
            hit.similarity
        );
        println!("     {}", preview(&hit.recipe.content, 120));
        println!();
    }

    Ok(())
}

/// First `max` characters of `text` on one line.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
