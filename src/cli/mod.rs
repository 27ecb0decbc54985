pub mod chat;
pub mod doctor;
pub mod export;
pub mod import;
pub mod list;
pub mod re_embed;
pub mod remove;
pub mod reset;
pub mod search;
pub mod show;
pub mod stats;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use larder::config::{EmbeddingConfig, LarderConfig};
use larder::embedding::{self, local, EmbeddingProvider};

const MODEL_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Open the configured database for a one-shot command.
pub fn open_db(config: &LarderConfig) -> Result<rusqlite::Connection> {
    let db_path = config.resolved_db_path();
    larder::db::open_database(&db_path)
}

/// Load the configured embedding provider, shareable across blocking tasks.
pub fn load_embedder(config: &LarderConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider = embedding::create_provider(&config.embedding)
        .context("failed to create embedding provider")?;
    Ok(Arc::from(provider))
}

/// Embed one text on a blocking thread.
pub async fn embed_text(provider: &Arc<dyn EmbeddingProvider>, text: String) -> Result<Vec<f32>> {
    let provider = Arc::clone(provider);
    tokio::task::spawn_blocking(move || provider.embed(&text)).await?
}

/// A bar for `len` items, in the style shared by every long-running command.
pub fn progress_bar(len: u64, template: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

/// Download the ONNX embedding model and tokenizer to the cache directory.
pub async fn model_download(config: &EmbeddingConfig) -> Result<()> {
    let (model_path, tokenizer_path) = local::model_paths(config);
    if let Some(cache_dir) = model_path.parent() {
        std::fs::create_dir_all(cache_dir)
            .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;
    }

    for (label, url, path) in [
        ("model.onnx (~90MB)", MODEL_URL, &model_path),
        ("tokenizer.json", TOKENIZER_URL, &tokenizer_path),
    ] {
        if path.exists() {
            println!("Already present: {}", path.display());
            continue;
        }
        println!("Downloading {label}...");
        download_file(url, path).await?;
        println!("Saved to {}", path.display());
    }

    println!("Embedding model ready.");
    Ok(())
}

/// Download a file with a progress bar, writing to a temp file and renaming on success.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    anyhow::ensure!(
        response.status().is_success(),
        "download failed with HTTP {}",
        response.status()
    );

    let pb = match response.content_length() {
        Some(size) => progress_bar(size, "  {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})"),
        None => ProgressBar::new_spinner(),
    };

    let tmp_path = dest.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

    let bytes = response.bytes().await.context("error reading response")?;
    pb.inc(bytes.len() as u64);
    file.write_all(&bytes).await.context("error writing to file")?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, dest)
        .await
        .context("failed to rename temp file")?;

    pb.finish_and_clear();
    Ok(())
}
