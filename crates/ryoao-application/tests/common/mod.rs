//! Shared setup for the scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ryoao_application::{AnalysisService, ConversationThread, SessionStore};
use ryoao_core::analysis::{AnalysisResult, HistoryEntry};
use ryoao_core::backend::{AccessToken, AnalysisBackend, AuthBackend, BackendError};
use ryoao_core::document::Document;
use ryoao_infrastructure::{BundledFixture, FileTokenStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const LIVE_ANALYSIS: &str = "Here is the review:\n```json\n[\n  {\"severity\": \"Low\", \"title\": \"Governing law\", \"description\": \"Foreign court.\", \"recommendedAction\": \"Pick local courts.\"}\n]\n```\nLet me know if you need more.";

/// A backend that counts every call it receives.
#[derive(Default)]
pub struct CountingBackend {
    pub logins: AtomicUsize,
    pub analyses: AtomicUsize,
    pub chats: AtomicUsize,
    pub chat_delays: HashMap<String, Duration>,
}

impl CountingBackend {
    pub fn with_chat_delays(delays: &[(&str, u64)]) -> Self {
        Self {
            chat_delays: delays
                .iter()
                .map(|(msg, ms)| (msg.to_string(), Duration::from_millis(*ms)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn network_calls(&self) -> usize {
        self.analyses.load(Ordering::SeqCst) + self.chats.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackend for CountingBackend {
    async fn login(&self, username: &str, _password: &str) -> Result<AccessToken, BackendError> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken(format!("jwt-{username}")))
    }
}

#[async_trait]
impl AnalysisBackend for CountingBackend {
    async fn analyze(&self, _token: &str, _document: &Document) -> Result<String, BackendError> {
        self.analyses.fetch_add(1, Ordering::SeqCst);
        Ok(LIVE_ANALYSIS.to_string())
    }

    async fn chat(
        &self,
        _token: &str,
        _context: &AnalysisResult,
        message: &str,
    ) -> Result<String, BackendError> {
        self.chats.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.chat_delays.get(message) {
            tokio::time::sleep(*delay).await;
        }
        Ok(format!("R:{message}"))
    }

    async fn history(&self, _token: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        Ok(Vec::new())
    }
}

pub struct App {
    pub backend: Arc<CountingBackend>,
    pub session: Arc<SessionStore>,
    pub analysis: Arc<AnalysisService>,
    pub thread: Arc<ConversationThread>,
    pub tokens: Arc<FileTokenStore>,
    _dir: TempDir,
}

pub fn app(backend: CountingBackend) -> App {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(backend);
    let tokens = Arc::new(FileTokenStore::with_path(dir.path().join("credentials.toml")));
    let session = Arc::new(SessionStore::new(backend.clone(), tokens.clone()));
    let analysis = AnalysisService::new(
        session.clone(),
        backend.clone(),
        Arc::new(BundledFixture),
        Duration::from_millis(1000),
    );
    let thread = ConversationThread::new(&session, analysis.clone());

    App {
        backend,
        session,
        analysis,
        thread,
        tokens,
        _dir: dir,
    }
}

pub fn document() -> Document {
    Document::new("nda.pdf", "application/pdf", b"%PDF-1.7 contract".to_vec())
}
