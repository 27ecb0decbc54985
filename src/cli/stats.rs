use anyhow::Result;

use larder::config::LarderConfig;
use larder::recipes::stats::recipe_stats;

/// Display recipe store statistics in the terminal.
pub fn stats(config: &LarderConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = super::open_db(config)?;

    let stats = recipe_stats(&conn, Some(&db_path))?;

    println!("Recipe Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total recipes:       {}", stats.total_recipes);
    println!("  Missing vectors:     {}", stats.missing_vectors);
    println!();

    if !stats.by_tag.is_empty() {
        println!("By Tag:");
        for (tag, count) in &stats.by_tag {
            println!("  {:<16} {}", tag, count);
        }
        println!();
    }

    println!("Database size:         {} bytes", stats.db_size_bytes);
    if let Some(ref oldest) = stats.oldest_recipe {
        println!("Oldest recipe:         {oldest}");
    }
    if let Some(ref newest) = stats.newest_recipe {
        println!("Newest recipe:         {newest}");
    }

    if stats.missing_vectors > 0 {
        println!();
        println!("Some recipes cannot be retrieved. Run `larder re-embed` to fix.");
    }
    Ok(())
}
