//! AnalysisService - analyze and chat requests routed by session mode.
//!
//! In live mode requests go to the [`AnalysisBackend`] with the session's
//! bearer token. In dummy mode analysis comes from the [`FixtureSource`] and
//! the backend is never called. The service owns the current
//! [`AnalysisResult`] and drops it whenever the session resets.

use crate::session_store::SessionStore;
use ryoao_core::analysis::{AnalysisResult, HistoryEntry, parse};
use ryoao_core::backend::AnalysisBackend;
use ryoao_core::document::Document;
use ryoao_core::session::{ObserverList, ResetCause, ResetObserver, Session};
use ryoao_core::storage::FixtureSource;
use ryoao_core::{Result, RyoaoError};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::time::Instant;

const ANALYZE_FAILED: &str = "The analysis request failed. Please try again.";
const CHAT_FAILED: &str = "The assistant could not answer. Please try again.";
const HISTORY_FAILED: &str = "Could not load the analysis history.";

pub struct AnalysisService {
    session: Arc<SessionStore>,
    backend: Arc<dyn AnalysisBackend>,
    fixture: Arc<dyn FixtureSource>,
    dummy_latency: Duration,
    current: RwLock<Option<Arc<AnalysisResult>>>,
    observers: ObserverList,
}

impl AnalysisService {
    /// Creates the service and subscribes it to session resets.
    pub fn new(
        session: Arc<SessionStore>,
        backend: Arc<dyn AnalysisBackend>,
        fixture: Arc<dyn FixtureSource>,
        dummy_latency: Duration,
    ) -> Arc<Self> {
        let service = Arc::new(Self {
            session: session.clone(),
            backend,
            fixture,
            dummy_latency,
            current: RwLock::new(None),
            observers: ObserverList::new(),
        });

        let observer: Arc<dyn ResetObserver> = service.clone();
        session.subscribe(Arc::downgrade(&observer));
        service
    }

    /// Registers a dependent of the current result.
    pub fn subscribe(&self, observer: Weak<dyn ResetObserver>) {
        self.observers.subscribe(observer);
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Analyzes `document` and makes the outcome the current result.
    ///
    /// The document is ignored in dummy mode. A result whose session ended
    /// while the request was in flight is discarded.
    pub async fn analyze(&self, document: Option<Document>) -> Result<Arc<AnalysisResult>> {
        let epoch = self.session.epoch();
        let result = match self.session.current() {
            Session::Dummy => self.analyze_dummy().await?,
            Session::Live { token } => self.analyze_live(&token, document).await?,
            Session::LoggedOut => {
                return Err(RyoaoError::validation(
                    "Log in or switch to dummy mode before analyzing",
                ));
            }
        };

        let result = Arc::new(result);
        {
            // Checked under the lock so a concurrent reset either sees the
            // stored result or makes this check fail.
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if self.session.epoch() != epoch {
                tracing::warn!("Session changed during analysis; discarding result");
                return Err(RyoaoError::analysis(
                    "The session changed while the analysis was running",
                ));
            }
            *current = Some(result.clone());
        }

        tracing::info!(
            findings = result.len(),
            high = result.high_count(),
            "Analysis completed"
        );
        self.observers.publish(ResetCause::AnalysisReplaced);
        Ok(result)
    }

    async fn analyze_dummy(&self) -> Result<AnalysisResult> {
        let started = Instant::now();
        let raw = self.fixture.load().await.map_err(|err| {
            RyoaoError::analysis(format!("Could not load the sample analysis: {}", err.message()))
        })?;
        let records = parse(&raw).map_err(|err| {
            RyoaoError::analysis(format!("The sample analysis is invalid: {err}"))
        })?;

        tokio::time::sleep_until(started + self.dummy_latency).await;
        tracing::debug!(findings = records.len(), "Served dummy analysis");
        Ok(AnalysisResult::new(records))
    }

    async fn analyze_live(&self, token: &str, document: Option<Document>) -> Result<AnalysisResult> {
        let document = document
            .filter(|d| !d.is_empty())
            .ok_or_else(|| RyoaoError::validation("Select a contract document to analyze"))?;

        let raw = self.backend.analyze(token, &document).await.map_err(|err| {
            tracing::warn!(error = %err, file = %document.file_name, "Analyze request failed");
            RyoaoError::analysis(err.user_message(ANALYZE_FAILED))
        })?;

        let records = parse(&raw).map_err(|err| {
            tracing::warn!(error = %err, "Analysis response rejected");
            RyoaoError::analysis(format!("The analysis response could not be read: {err}"))
        })?;
        Ok(AnalysisResult::new(records))
    }

    /// Fails unless the session can chat. Only live sessions can.
    pub fn ensure_chat_available(&self) -> Result<String> {
        match self.session.current() {
            Session::Live { token } => Ok(token),
            Session::Dummy => Err(RyoaoError::chat("Chat is not available in dummy mode")),
            Session::LoggedOut => Err(RyoaoError::chat("Log in to chat about the analysis")),
        }
    }

    /// Asks the assistant about `context`. The whole result travels with the
    /// message.
    pub async fn chat(&self, context: &AnalysisResult, message: &str) -> Result<String> {
        let token = self.ensure_chat_available()?;
        if message.trim().is_empty() {
            return Err(RyoaoError::validation("Enter a question first"));
        }

        self.backend
            .chat(&token, context, message)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Chat request failed");
                RyoaoError::chat(err.user_message(CHAT_FAILED))
            })
    }

    /// Past analyses of the logged-in user.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let token = match self.session.current() {
            Session::Live { token } => token,
            Session::Dummy => {
                return Err(RyoaoError::validation("History is not available in dummy mode"));
            }
            Session::LoggedOut => return Err(RyoaoError::validation("Log in to see your history")),
        };

        self.backend.history(&token).await.map_err(|err| {
            tracing::warn!(error = %err, "History request failed");
            RyoaoError::analysis(err.user_message(HISTORY_FAILED))
        })
    }

    pub fn current(&self) -> Option<Arc<AnalysisResult>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drops the current result; dependents reset as on a replacement.
    pub fn clear(&self) {
        self.drop_current();
        self.observers.publish(ResetCause::AnalysisReplaced);
    }

    fn drop_current(&self) -> bool {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }
}

impl ResetObserver for AnalysisService {
    fn on_reset(&self, cause: ResetCause) {
        if cause == ResetCause::AnalysisReplaced {
            return;
        }
        if self.drop_current() {
            tracing::debug!(?cause, "Dropped analysis result");
        }
    }
}
