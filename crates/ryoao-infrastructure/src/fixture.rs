//! Dummy-mode fixture sources.

use async_trait::async_trait;
use ryoao_core::storage::FixtureSource;
use ryoao_core::{Result, RyoaoError};
use std::path::PathBuf;
use std::sync::Arc;

const BUNDLED_DUMMY_RESULT: &str = include_str!("../fixtures/dummy_result.json");

/// The canned analysis compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledFixture;

#[async_trait]
impl FixtureSource for BundledFixture {
    async fn load(&self) -> Result<String> {
        Ok(BUNDLED_DUMMY_RESULT.to_string())
    }
}

/// A canned analysis read from a local file.
#[derive(Debug, Clone)]
pub struct FileFixture {
    path: PathBuf,
}

impl FileFixture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FixtureSource for FileFixture {
    async fn load(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RyoaoError::storage(format!(
                "Failed to read fixture {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Picks the file fixture when a path is configured, else the bundled one.
pub fn fixture_source(path: Option<PathBuf>) -> Arc<dyn FixtureSource> {
    match path {
        Some(path) => Arc::new(FileFixture::new(path)),
        None => Arc::new(BundledFixture),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ryoao_core::analysis::{Severity, parse};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_bundled_fixture_parses_to_two_findings() {
        let raw = BundledFixture.load().await.unwrap();
        let records = parse(&raw).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, Severity::High);
        assert_eq!(records[1].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_file_fixture_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fixture.json");
        std::fs::write(&path, "[]").unwrap();

        assert_eq!(FileFixture::new(&path).load().await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_missing_file_fixture_is_storage_error() {
        let err = FileFixture::new("/nonexistent/fixture.json").load().await.unwrap_err();
        assert!(err.is_storage());
    }
}
