//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// TMDB configuration.
    pub tmdb: TmdbConfig,
    /// OMDb configuration (secondary ratings provider).
    pub omdb: OmdbConfig,
    /// Import pipeline tuning.
    pub import: ImportConfig,
    /// Storage paths.
    pub storage: StorageConfig,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Language for responses.
    pub language: String,
}

/// OMDb configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    /// API key. Ratings lookups are skipped when unset.
    pub api_key: Option<String>,
}

/// Import pipeline tuning.
///
/// Batch size and delay are deliberately configuration, not constants: they
/// exist to respect third-party rate limits and carry no correctness weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Rows resolved concurrently within one batch.
    pub batch_size: usize,
    /// Pause between batches, in milliseconds.
    pub batch_delay_ms: u64,
    /// Per-row timeout for external calls, in seconds.
    pub request_timeout_secs: u64,
}

/// Storage paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory for downloaded poster/backdrop artwork.
    pub artwork_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb: TmdbConfig::default(),
            omdb: OmdbConfig::default(),
            import: ImportConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TMDB_API_KEY").ok(),
            language: "en-US".to_string(),
        }
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OMDB_API_KEY").ok(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs_config_path();
        Self {
            database_path: base.join("catalog.db"),
            artwork_dir: base.join("artwork"),
        }
    }
}

impl ImportConfig {
    /// Inter-batch delay as a Duration.
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Per-row timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog_importer")
}

/// Load configuration from file.
pub fn load_config() -> Config {
    let config_path = dirs_config_path().join("config.toml");

    if config_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str(&content) {
                return config;
            }
        }
    }

    Config::default()
}
