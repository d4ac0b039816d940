//! ConversationThread - the chat log about the current analysis.
//!
//! Sends are serialized: a FIFO lock admits one chat call at a time, so
//! replies land in the order the questions were asked. Any reset (new
//! analysis, logout, mode change) empties the log and bumps the thread epoch;
//! a reply that arrives for an older epoch is dropped.

use crate::analysis_service::AnalysisService;
use crate::session_store::SessionStore;
use ryoao_core::conversation::ChatTurn;
use ryoao_core::session::{ResetCause, ResetObserver};
use ryoao_core::{Result, RyoaoError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Default)]
struct ThreadState {
    turns: Vec<ChatTurn>,
    pending_input: String,
    epoch: u64,
}

pub struct ConversationThread {
    analysis: Arc<AnalysisService>,
    state: Mutex<ThreadState>,
    send_slot: AsyncMutex<()>,
}

impl ConversationThread {
    /// Creates an empty thread that resets with the session and the analysis.
    pub fn new(session: &SessionStore, analysis: Arc<AnalysisService>) -> Arc<Self> {
        let thread = Arc::new(Self {
            analysis: analysis.clone(),
            state: Mutex::new(ThreadState::default()),
            send_slot: AsyncMutex::new(()),
        });

        let observer: Arc<dyn ResetObserver> = thread.clone();
        session.subscribe(Arc::downgrade(&observer));
        analysis.subscribe(Arc::downgrade(&observer));
        thread
    }

    fn state(&self) -> MutexGuard<'_, ThreadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends `message` and returns the assistant's reply.
    ///
    /// The user turn is appended before the request and stays even when the
    /// request fails. A reply that outlives a reset is discarded and reported
    /// as a chat error.
    pub async fn send(&self, message: &str) -> Result<String> {
        let _slot = self.send_slot.lock().await;

        self.analysis.ensure_chat_available()?;
        if message.trim().is_empty() {
            return Err(RyoaoError::validation("Enter a question first"));
        }
        let context = self
            .analysis
            .current()
            .ok_or_else(|| RyoaoError::chat("Analyze a document before asking questions"))?;

        let epoch = {
            let mut state = self.state();
            state.turns.push(ChatTurn::user(message));
            state.pending_input.clear();
            state.epoch
        };

        let reply = self.analysis.chat(&context, message).await?;

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!("Dropped chat reply for a reset conversation");
            return Err(RyoaoError::chat(
                "The conversation was reset before the reply arrived",
            ));
        }
        state.turns.push(ChatTurn::assistant(reply.clone()));
        Ok(reply)
    }

    /// Sends whatever is in the input buffer.
    pub async fn send_pending(&self) -> Result<String> {
        let message = self.pending_input();
        self.send(&message).await
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.state().turns.clone()
    }

    pub fn pending_input(&self) -> String {
        self.state().pending_input.clone()
    }

    pub fn set_pending_input(&self, text: impl Into<String>) {
        self.state().pending_input = text.into();
    }

    pub fn reset(&self) {
        let mut state = self.state();
        state.turns.clear();
        state.pending_input.clear();
        state.epoch += 1;
    }
}

impl ResetObserver for ConversationThread {
    fn on_reset(&self, cause: ResetCause) {
        tracing::debug!(?cause, "Resetting conversation");
        self.reset();
    }
}
