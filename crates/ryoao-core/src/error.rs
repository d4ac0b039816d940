//! Error types for ryoao.

use crate::analysis::ParseError;
use crate::notice::{Notice, NoticeLevel};
use thiserror::Error;

/// A shared error type for every ryoao operation.
///
/// Each variant carries the most specific human-readable message available.
/// None of them is fatal: callers surface them as a [`Notice`] and the user
/// may retry the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RyoaoError {
    /// Bad credentials or unreachable auth backend
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Missing or unusable local input (no document, blank message, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed or schema-violating analysis payload
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Transport or parse failure while analyzing a document
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Transport failure during chat, or chat outside live mode
    #[error("Chat failed: {0}")]
    Chat(String),

    /// Durable storage (token file, report output) failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report rendering failure
    #[error("Report error: {0}")]
    Report(String),
}

impl RyoaoError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    pub fn chat(message: impl Into<String>) -> Self {
        Self::Chat(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn report(message: impl Into<String>) -> Self {
        Self::Report(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_analysis(&self) -> bool {
        matches!(self, Self::Analysis(_))
    }

    pub fn is_chat(&self) -> bool {
        matches!(self, Self::Chat(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    // ============================================================================
    // Presentation
    // ============================================================================

    /// The message meant for the user, without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Parse(err) => err.to_string(),
            Self::Auth(message)
            | Self::Validation(message)
            | Self::Analysis(message)
            | Self::Chat(message)
            | Self::Storage(message)
            | Self::Config(message)
            | Self::Report(message) => message.clone(),
        }
    }

    /// Converts the error into a notification for the presentation layer.
    pub fn to_notice(&self) -> Notice {
        let title = match self {
            Self::Auth(_) => "Login failed",
            Self::Validation(_) => "Check your input",
            Self::Parse(_) | Self::Analysis(_) => "Analysis error",
            Self::Chat(_) => "Chat error",
            Self::Storage(_) => "Storage error",
            Self::Config(_) => "Configuration error",
            Self::Report(_) => "Report error",
        };
        Notice::new(NoticeLevel::Error, title, self.message())
    }
}

impl From<std::io::Error> for RyoaoError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<toml::de::Error> for RyoaoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RyoaoError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// A type alias for `Result<T, RyoaoError>`.
pub type Result<T> = std::result::Result<T, RyoaoError>;
