//! CLI `reset` command — delete all recipes after confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use larder::config::LarderConfig;
use larder::recipes::store::clear_recipes;

pub fn reset(config: &LarderConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("WARNING: This will permanently delete ALL recipes and their vectors.");
    println!("Database: {}", db_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let conn = super::open_db(config)?;
    clear_recipes(&conn)?;

    println!("All recipes deleted. Database reset complete.");
    Ok(())
}
