//! Configuration for qacache.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::EvictionPolicy;
use crate::{QaCacheError, QaCacheResult};

/// Main configuration for qacache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Question dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// LLM backend settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Traffic run settings.
    #[serde(default)]
    pub traffic: TrafficConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Eviction policy (lru, lfu).
    #[serde(default = "default_cache_policy")]
    pub policy: EvictionPolicy,

    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Cache LLM error replies like regular answers.
    #[serde(default = "default_true")]
    pub cache_errors: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: default_cache_policy(),
            capacity: default_cache_capacity(),
            cache_errors: true,
        }
    }
}

fn default_cache_policy() -> EvictionPolicy {
    EvictionPolicy::Lru
}

fn default_cache_capacity() -> usize {
    500
}

fn default_true() -> bool {
    true
}

/// Question dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Headerless CSV with question_id, question_text, question_title, best_answer_text.
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Fixed sampling seed (random if absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            seed: None,
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/test.csv")
}

/// LLM backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Command to execute.
    #[serde(default = "default_llm_command")]
    pub command: String,

    /// Model passed to the CLI with `-m`.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Extra arguments, placed before the prompt.
    #[serde(default)]
    pub args: Vec<String>,

    /// Specific timeout (in seconds).
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            command: default_llm_command(),
            model: default_llm_model(),
            args: Vec::new(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_command() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Abort a run on the first persistence error.
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: default_db_path(),
            fail_fast: false,
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".qacache/qacache.db")
}

/// Traffic run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    /// Questions processed by `qacache run`.
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,

    /// Progress is reported every N questions.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Cache metrics are persisted every N questions (0 = only at the end).
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval: usize,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            num_questions: default_num_questions(),
            progress_interval: default_progress_interval(),
            metrics_interval: default_metrics_interval(),
        }
    }
}

fn default_num_questions() -> usize {
    10_000
}

fn default_progress_interval() -> usize {
    100
}

fn default_metrics_interval() -> usize {
    1_000
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> QaCacheResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> QaCacheResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            dataset: DatasetConfig::default(),
            llm: LlmConfig::default(),
            storage: StorageConfig::default(),
            traffic: TrafficConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load("qacache.toml").unwrap_or_else(|_| Self::default_config())
    }

    /// Rejects settings the cache and the logger cannot work with.
    pub fn validate(&self) -> QaCacheResult<()> {
        if self.cache.capacity == 0 {
            return Err(QaCacheError::config("cache.capacity deve ser >= 1"));
        }

        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(QaCacheError::config(format!(
                "general.log_format desconhecido: '{}' (use text ou json)",
                self.general.log_format
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
