//! CLI `doctor` command — check the database, the embedding model files and
//! the language model settings.

use anyhow::{Context, Result};

use larder::config::LarderConfig;
use larder::db;
use larder::embedding::local;

pub fn doctor(config: &LarderConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("Larder Health Report");
    println!("====================");
    println!();

    let (model_path, tokenizer_path) = local::model_paths(&config.embedding);
    let model_ready = model_path.exists() && tokenizer_path.exists();
    println!("Embedding files:   {}", if model_ready { "present" } else { "MISSING" });
    if !model_ready {
        println!("  Run `larder model download` to fetch them.");
    }
    println!("LLM endpoint:      {} ({})", config.llm.base_url, config.llm.model);
    println!(
        "LLM API key:       {}",
        if config.llm.api_key.is_empty() { "(not set)" } else { "set" }
    );
    println!();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `larder import <PATH>` to create it and add recipes.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("sqlite-vec:        {}", report.sqlite_vec_version);
    println!();
    println!("Embedding model:");
    println!("  Stored:          {}", report.embedding_model.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.embedding.model);
    if let Some(ref stored) = report.embedding_model {
        if stored != &config.embedding.model {
            println!("  WARNING: model mismatch! Run `larder re-embed` to update vectors.");
        } else {
            println!("  Status:          OK (match)");
        }
    }
    println!();
    println!("Row counts:");
    println!("  Recipes:         {}", report.recipe_count);
    println!("  Vectors:         {}", report.vector_count);
    if report.vector_count < report.recipe_count {
        println!("  WARNING: some recipes have no vector. Run `larder re-embed`.");
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Export what is still readable: larder export > recipes.json");
        println!("  2. Reset and reimport:            larder reset && larder import recipes.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
