//! Application configuration.
//!
//! Loaded from `config.toml`; every field has a default so a missing or
//! partial file is fine. A few environment variables override the file.

use crate::paths::RyoaoPaths;
use crate::storage::AtomicTomlFile;
use ryoao_core::{Result, RyoaoError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding [`AppConfig::api_base_url`].
pub const ENV_API_URL: &str = "RYOAO_API_URL";
/// Environment variable overriding [`AppConfig::fixture_path`].
pub const ENV_FIXTURE: &str = "RYOAO_FIXTURE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the analysis backend.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Minimum duration of a dummy-mode analysis.
    pub dummy_latency_ms: u64,
    /// Replaces the bundled dummy fixture when set.
    pub fixture_path: Option<PathBuf>,
    /// Where exported reports go; the working directory when unset.
    pub report_dir: Option<PathBuf>,
    pub rows_per_page: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 60,
            dummy_latency_ms: 1000,
            fixture_path: None,
            report_dir: None,
            rows_per_page: 12,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dummy_latency(&self) -> Duration {
        Duration::from_millis(self.dummy_latency_ms)
    }

    /// Applies overrides looked up through `lookup` (usually `std::env::var`).
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(path) = lookup(ENV_FIXTURE).filter(|v| !v.trim().is_empty()) {
            self.fixture_path = Some(PathBuf::from(path));
        }
        self
    }

    fn validate(self) -> Result<Self> {
        if self.api_base_url.trim().is_empty() {
            return Err(RyoaoError::config("api_base_url must not be empty"));
        }
        if self.rows_per_page == 0 {
            return Err(RyoaoError::config("rows_per_page must be at least 1"));
        }
        Ok(self)
    }
}

/// Loads and saves [`AppConfig`].
pub struct ConfigService {
    file: AtomicTomlFile<AppConfig>,
}

impl ConfigService {
    pub fn new(paths: &RyoaoPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| RyoaoError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Loads the file (defaults when missing) without environment overrides.
    pub fn load(&self) -> Result<AppConfig> {
        let config = self.file.load()?.unwrap_or_default();
        config.validate()
    }

    /// Loads the file and applies environment overrides.
    pub fn load_with_env(&self) -> Result<AppConfig> {
        let config = self.load()?.apply_overrides(|key| std::env::var(key).ok());
        tracing::debug!(api_base_url = %config.api_base_url, "Loaded configuration");
        config.validate()
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)?;
        Ok(())
    }
}
