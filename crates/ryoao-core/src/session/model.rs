//! Session state.

use crate::error::{Result, RyoaoError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an active session talks to the analysis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Authenticated against the real backend.
    Live,
    /// Sandboxed: canned fixture data, no network calls.
    Dummy,
}

/// The client's single session.
///
/// Exactly one of the three states holds at any time. `Live` always carries a
/// non-empty bearer token; build it through [`Session::live`] to keep that so.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    LoggedOut,
    Live {
        token: String,
    },
    Dummy,
}

impl Session {
    /// Creates a live session, rejecting an empty token.
    pub fn live(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(RyoaoError::auth("The server returned an empty access token"));
        }
        Ok(Self::Live { token })
    }

    pub fn mode(&self) -> Option<Mode> {
        match self {
            Self::LoggedOut => None,
            Self::Live { .. } => Some(Mode::Live),
            Self::Dummy => Some(Mode::Dummy),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Live { token } => Some(token),
            _ => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, Self::Dummy)
    }

    pub fn is_logged_in(&self) -> bool {
        !matches!(self, Self::LoggedOut)
    }
}

// Tokens never end up in logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedOut => f.write_str("LoggedOut"),
            Self::Live { .. } => f.write_str("Live { token: <redacted> }"),
            Self::Dummy => f.write_str("Dummy"),
        }
    }
}
