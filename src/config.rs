use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::recipes::search::MAX_KNN_RESULTS;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LarderConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Upper bound on recipes placed into a single prompt.
    pub max_results: usize,
    /// Cosine similarity a recipe must reach to count as a match.
    pub min_similarity: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AssistantConfig {
    /// Replaces the built-in persona/policy block when set.
    pub instructions_file: Option<String>,
    /// Replaces the built-in few-shot dialogues when set.
    pub examples_file: Option<String>,
    /// Most recent turns rendered into the prompt. 0 renders all of them.
    pub max_history_turns: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8501,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_larder_dir()
            .join("recipes.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_larder_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            min_similarity: 0.3,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key: String::new(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

/// Returns `~/.larder/`, or `./.larder/` when no home directory is known.
pub fn default_larder_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".larder")
}

/// Returns the default config file path: `~/.larder/config.toml`
pub fn default_config_path() -> PathBuf {
    default_larder_dir().join("config.toml")
}

impl LarderConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            LarderConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject retrieval settings the vector index cannot honour.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.retrieval.max_results <= MAX_KNN_RESULTS,
            "retrieval.max_results is {}, the vector index allows at most {MAX_KNN_RESULTS}",
            self.retrieval.max_results
        );
        anyhow::ensure!(
            (-1.0..=1.0).contains(&self.retrieval.min_similarity),
            "retrieval.min_similarity must be between -1 and 1, got {}",
            self.retrieval.min_similarity
        );
        Ok(())
    }

    /// Apply environment variable overrides (LARDER_DB, LARDER_LOG_LEVEL, LARDER_LLM_*).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LARDER_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("LARDER_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("LARDER_LLM_BASE_URL") {
            self.llm.base_url = val;
        }
        if let Ok(val) = std::env::var("LARDER_LLM_MODEL") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("LARDER_LLM_API_KEY") {
            self.llm.api_key = val;
        }
        if self.llm.api_key.is_empty() {
            if let Ok(val) = std::env::var("OPENAI_API_KEY") {
                self.llm.api_key = val;
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LarderConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.retrieval.max_results, 3);
        assert_eq!(config.assistant.max_history_turns, 0);
        assert!(config.assistant.instructions_file.is_none());
        assert!(config.storage.db_path.ends_with("recipes.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 9000

[storage]
db_path = "/tmp/recipes.db"

[llm]
base_url = "http://localhost:11434/v1"
model = "llama3"

[assistant]
max_history_turns = 4
"#;
        let config: LarderConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.db_path, "/tmp/recipes.db");
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.assistant.max_history_turns, 4);
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.retrieval.min_similarity, 0.3);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = LarderConfig::default();
        std::env::set_var("LARDER_DB", "/tmp/override.db");
        std::env::set_var("LARDER_LOG_LEVEL", "trace");
        std::env::set_var("LARDER_LLM_MODEL", "mistral");
        std::env::set_var("LARDER_LLM_API_KEY", "sk-test");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.api_key, "sk-test");

        // Clean up
        std::env::remove_var("LARDER_DB");
        std::env::remove_var("LARDER_LOG_LEVEL");
        std::env::remove_var("LARDER_LLM_MODEL");
        std::env::remove_var("LARDER_LLM_API_KEY");
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = LarderConfig::load_from(tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.embedding.provider, "local");
    }

    #[test]
    fn oversized_max_results_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[retrieval]\nmax_results = 5000\n").unwrap();

        let err = LarderConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("max_results"));

        std::fs::write(&path, "[retrieval]\nmax_results = 4096\n").unwrap();
        assert_eq!(LarderConfig::load_from(&path).unwrap().retrieval.max_results, 4096);
    }

    #[test]
    fn out_of_range_similarity_is_rejected() {
        let mut config = LarderConfig::default();
        config.retrieval.min_similarity = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/lib/x.db"), PathBuf::from("/var/lib/x.db"));
    }
}
