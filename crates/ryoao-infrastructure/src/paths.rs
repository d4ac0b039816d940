//! Unified path management for ryoao files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/ryoao/             # Config directory (platform default)
//! ├── config.toml              # Application configuration
//! ├── credentials.toml         # Durable bearer token (mode 600)
//! └── logs/                    # Application logs
//!     └── ryoao.YYYY-MM-DD.log
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "ryoao";

/// Errors that can occur during path resolution.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

/// Resolves every file location ryoao uses.
///
/// With a base path all files live directly under it, which keeps tests
/// away from the real configuration directory.
#[derive(Debug, Clone, Default)]
pub struct RyoaoPaths {
    base: Option<PathBuf>,
}

impl RyoaoPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the ryoao configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/ryoao/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Path to the durable token file.
    pub fn credentials_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("credentials.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
