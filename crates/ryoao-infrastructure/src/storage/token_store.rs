//! Durable bearer token storage.

use super::atomic_toml::AtomicTomlFile;
use crate::paths::RyoaoPaths;
use ryoao_core::storage::TokenStore;
use ryoao_core::{Result, RyoaoError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize)]
struct Credentials {
    access_token: String,
}

/// Keeps the bearer token in `credentials.toml`.
///
/// The file is written atomically with owner-only permissions. The token
/// itself is never logged.
pub struct FileTokenStore {
    file: AtomicTomlFile<Credentials>,
}

impl FileTokenStore {
    /// Creates a store at the default location resolved by `paths`.
    pub fn new(paths: &RyoaoPaths) -> Result<Self> {
        let path = paths
            .credentials_file()
            .map_err(|e| RyoaoError::storage(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a store at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let token = self
            .file
            .load()?
            .map(|c| c.access_token)
            .filter(|t| !t.trim().is_empty());
        Ok(token)
    }

    fn save(&self, token: &str) -> Result<()> {
        self.file.save(&Credentials {
            access_token: token.to_string(),
        })?;
        tracing::debug!(path = %self.file.path().display(), "Stored access token");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!(path = %self.file.path().display(), "Cleared access token");
        Ok(())
    }
}
