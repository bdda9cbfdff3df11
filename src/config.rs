//! Server configuration.
//!
//! Loaded from a YAML file (missing file means defaults) and then overridden
//! by command line flags or their environment variables.

use crate::errors::{AppError, AppResult};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "counselflow.yaml";
pub const DATABASE_FILE: &str = "counselflow.sqlite";
pub const LOG_FILE_PREFIX: &str = "counselflow.log";

const MAX_GENERATION_DELAY_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Load the demo fixtures into every record view at startup.
    #[serde(default = "default_true")]
    pub seed_fixtures: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub json: bool,
    /// Write to a daily rolling file under `<dataDir>/logs` instead of stdout.
    #[serde(default = "default_true")]
    pub file: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
    /// Completed jobs kept for polling; older ones are evicted first.
    #[serde(default = "default_retain_ready")]
    pub retain_ready: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            seed_fixtures: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: true,
            file: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_pending: default_max_pending(),
            retain_ready: default_retain_ready(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_delay_ms() -> u64 {
    2000
}
fn default_max_pending() -> usize {
    32
}
fn default_retain_ready() -> usize {
    100
}

/// Flag values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Reads `path` when it exists; a missing file yields defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.storage.data_dir = data_dir;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        if self.server.host.trim().is_empty() {
            validator.reject("server.host", "is required");
        }
        if self.server.port == 0 {
            validator.reject("server.port", "must be non-zero");
        }
        if self.storage.data_dir.as_os_str().is_empty() {
            validator.reject("storage.dataDir", "is required");
        }
        if self.generation.delay_ms > MAX_GENERATION_DELAY_MS {
            validator.reject(
                "generation.delayMs",
                format!("must be at most {} ms", MAX_GENERATION_DELAY_MS),
            );
        }
        if self.generation.max_pending == 0 {
            validator.reject("generation.maxPending", "must be at least 1");
        }
        if self.generation.retain_ready == 0 {
            validator.reject("generation.retainReady", "must be at least 1");
        }
        validator.finish().map_err(AppError::from)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.storage.data_dir.join(DATABASE_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.storage.data_dir.join("logs")
    }

    pub fn generation_delay(&self) -> Duration {
        Duration::from_millis(self.generation.delay_ms)
    }
}
