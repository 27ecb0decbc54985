use anyhow::Result;
use serde::Serialize;

use larder::config::LarderConfig;
use larder::recipes::store::list_recipes;
use larder::recipes::types::Recipe;

/// Export format, readable by `larder import`.
#[derive(Debug, Serialize)]
struct ExportData {
    recipes: Vec<Recipe>,
}

/// Export all recipes as JSON to stdout.
pub fn export(config: &LarderConfig) -> Result<()> {
    let conn = super::open_db(config)?;
    let data = ExportData {
        recipes: list_recipes(&conn)?,
    };

    println!("{}", serde_json::to_string_pretty(&data)?);
    eprintln!("Exported {} recipes.", data.recipes.len());
    Ok(())
}
