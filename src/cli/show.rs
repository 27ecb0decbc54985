//! CLI `show` command — display a single recipe and the document the assistant sees.

use anyhow::{anyhow, Result};

use larder::config::LarderConfig;
use larder::recipes::store::get_recipe;

pub fn show(config: &LarderConfig, id: &str) -> Result<()> {
    let conn = super::open_db(config)?;
    let recipe = get_recipe(&conn, id)?.ok_or_else(|| anyhow!("recipe not found: {id}"))?;

    println!("Recipe: {}", recipe.id);
    println!("{}", "=".repeat(50));
    println!("  Title:    {}", recipe.title);
    if !recipe.tags.is_empty() {
        println!("  Tags:     {}", recipe.tags.join(", "));
    }
    println!("  Created:  {}", recipe.created_at);
    println!();
    println!("Prompt document:");
    for line in recipe.as_document().lines() {
        println!("  {line}");
    }
    Ok(())
}
