//! Backend collaborator traits.
//!
//! The analysis service is opaque to ryoao: these traits describe the
//! contracts it relies on, decoupling the application logic from the
//! transport (HTTP in production, in-memory fakes in tests).

use crate::analysis::{AnalysisResult, HistoryEntry};
use crate::document::Document;
use async_trait::async_trait;
use thiserror::Error;

/// A failed backend call.
///
/// `detail` holds the server-supplied human-readable explanation when the
/// backend sent one; `message` always describes what went wrong technically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub status: Option<u16>,
    pub detail: Option<String>,
    pub message: String,
}

impl BackendError {
    /// The request never produced an HTTP response (connection, DNS, timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: None,
            message: message.into(),
        }
    }

    /// The backend answered with a non-success status.
    pub fn http(status: u16, detail: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            detail,
            message: message.into(),
        }
    }

    /// The backend answered successfully but the body was unusable.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::transport(message)
    }

    /// The most specific message to show a user: server detail, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Access token issued by the auth backend.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Credential exchange with the auth backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges a username and password for a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, BackendError>;
}

/// The analysis backend (`/analyze`, `/chat`, `/history`).
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Submits a document and returns the raw, possibly fenced, analysis text.
    async fn analyze(&self, token: &str, document: &Document) -> Result<String, BackendError>;

    /// Asks a follow-up question with the full analysis as context.
    async fn chat(
        &self,
        token: &str,
        context: &AnalysisResult,
        message: &str,
    ) -> Result<String, BackendError>;

    /// Lists analyses previously stored by the backend.
    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, BackendError>;
}
