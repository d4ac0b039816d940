//! Local storage traits.

use crate::error::Result;
use async_trait::async_trait;

/// Durable storage for the single bearer token.
///
/// Read on startup, written on login, cleared on logout. Implementations
/// should keep the token readable by the current user only.
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, token: &str) -> Result<()>;

    /// Removes the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

/// Source of the canned analysis payload used in dummy mode.
///
/// Loading must never touch the network analysis backend.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Returns the raw fixture text, schema-identical to a backend analysis.
    async fn load(&self) -> Result<String>;
}
