//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use ryoao_core::analysis::{AnalysisResult, HistoryEntry};
use ryoao_core::backend::{AccessToken, AnalysisBackend, AuthBackend, BackendError};
use ryoao_core::document::Document;
use ryoao_core::session::{ResetCause, ResetObserver};
use ryoao_core::storage::{FixtureSource, TokenStore};
use ryoao_core::{Result, RyoaoError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

pub const TWO_FINDINGS: &str = r#"```json
[
  {"rank": "高", "title": "Unlimited liability", "description": "No cap on damages.", "action": "Cap liability at fees paid."},
  {"rank": "Medium", "title": "Auto renewal", "description": "Renews silently.", "action": "Add a 60 day notice."}
]
```"#;

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
    fail_writes: bool,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
            fail_writes: false,
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            token: Mutex::new(None),
            fail_writes: true,
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.stored())
    }

    fn save(&self, token: &str) -> Result<()> {
        if self.fail_writes {
            return Err(RyoaoError::storage("disk full"));
        }
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

pub struct MockAuth {
    token: std::result::Result<String, Option<String>>,
    calls: Arc<AtomicUsize>,
}

impl MockAuth {
    pub fn accepting(token: &str) -> Self {
        Self {
            token: Ok(token.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn rejecting(detail: Option<&str>) -> Self {
        Self {
            token: Err(detail.map(str::to_string)),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl AuthBackend for MockAuth {
    async fn login(&self, _username: &str, _password: &str) -> std::result::Result<AccessToken, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.token {
            Ok(token) => Ok(AccessToken(token.clone())),
            Err(detail) => Err(BackendError::http(400, detail.clone(), "/login returned HTTP 400")),
        }
    }
}

/// Analysis backend answering chat with `re: <message>`.
pub struct MockAnalysis {
    analysis: std::result::Result<String, BackendError>,
    chat_error: Option<BackendError>,
    chat_delays: HashMap<String, Duration>,
    calls: Arc<AtomicUsize>,
    last_context: Mutex<Option<AnalysisResult>>,
}

impl MockAnalysis {
    pub fn returning(raw: &str) -> Self {
        Self {
            analysis: Ok(raw.to_string()),
            chat_error: None,
            chat_delays: HashMap::new(),
            calls: Arc::default(),
            last_context: Mutex::new(None),
        }
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            analysis: Err(error),
            ..Self::returning("[]")
        }
    }

    pub fn with_chat_error(mut self, error: BackendError) -> Self {
        self.chat_error = Some(error);
        self
    }

    pub fn with_chat_delay(mut self, message: &str, delay: Duration) -> Self {
        self.chat_delays.insert(message.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn last_context(&self) -> Option<AnalysisResult> {
        self.last_context.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for MockAnalysis {
    async fn analyze(&self, _token: &str, _document: &Document) -> std::result::Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.analysis.clone()
    }

    async fn chat(
        &self,
        _token: &str,
        context: &AnalysisResult,
        message: &str,
    ) -> std::result::Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(context.clone());
        if let Some(delay) = self.chat_delays.get(message) {
            tokio::time::sleep(*delay).await;
        }
        match &self.chat_error {
            Some(error) => Err(error.clone()),
            None => Ok(format!("re: {message}")),
        }
    }

    async fn history(&self, _token: &str) -> std::result::Result<Vec<HistoryEntry>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

pub struct StaticFixture(pub &'static str);

#[async_trait]
impl FixtureSource for StaticFixture {
    async fn load(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct CauseLog(Mutex<Vec<ResetCause>>);

impl ResetObserver for CauseLog {
    fn on_reset(&self, cause: ResetCause) {
        self.0.lock().unwrap().push(cause);
    }
}

/// Records every reset it receives.
pub struct Recorder(Arc<CauseLog>);

impl Recorder {
    pub fn new() -> Self {
        Self(Arc::new(CauseLog(Mutex::new(Vec::new()))))
    }

    pub fn weak(&self) -> Weak<dyn ResetObserver> {
        let observer: Arc<dyn ResetObserver> = self.0.clone();
        Arc::downgrade(&observer)
    }

    pub fn causes(&self) -> Vec<ResetCause> {
        self.0.0.lock().unwrap().clone()
    }
}

pub fn document() -> Document {
    Document::new("nda.txt", "text/plain", b"Article 1. Confidentiality".to_vec())
}
