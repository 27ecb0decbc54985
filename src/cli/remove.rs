use anyhow::{bail, Result};

use larder::config::LarderConfig;
use larder::recipes::store::remove_recipe;

/// Delete one recipe by id.
pub fn remove(config: &LarderConfig, id: &str) -> Result<()> {
    let mut conn = super::open_db(config)?;
    if !remove_recipe(&mut conn, id)? {
        bail!("recipe not found: {id}");
    }
    println!("Removed recipe {id}.");
    Ok(())
}
