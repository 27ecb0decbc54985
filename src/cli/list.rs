use anyhow::Result;

use larder::config::LarderConfig;
use larder::recipes::store::list_recipes;

/// Print every stored recipe, oldest first.
pub fn list(config: &LarderConfig) -> Result<()> {
    let conn = super::open_db(config)?;
    let recipes = list_recipes(&conn)?;

    if recipes.is_empty() {
        println!("No recipes stored. Add some with `larder import <PATH>`.");
        return Ok(());
    }

    for recipe in &recipes {
        let tags = if recipe.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", recipe.tags.join(", "))
        };
        println!("{}  {}{}", recipe.id, recipe.title, tags);
    }
    println!("\n{} recipe(s)", recipes.len());
    Ok(())
}
