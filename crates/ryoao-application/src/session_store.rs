//! SessionStore - owner of the client's single session.
//!
//! Every transition between `LoggedOut`, `Live` and `Dummy` goes through this
//! store. Each transition bumps the session epoch and publishes a
//! [`ResetCause`] to the registered observers before the call returns, so
//! dependents never see state from a session that no longer exists.

use ryoao_core::backend::AuthBackend;
use ryoao_core::session::{Mode, ModeSignal, ObserverList, ResetCause, ResetObserver, Session};
use ryoao_core::storage::TokenStore;
use ryoao_core::{Result, RyoaoError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

const LOGIN_FAILED: &str = "Could not log in. Check your username and password.";

pub struct SessionStore {
    state: RwLock<Session>,
    epoch: AtomicU64,
    auth: Arc<dyn AuthBackend>,
    tokens: Arc<dyn TokenStore>,
    observers: ObserverList,
}

impl SessionStore {
    /// Creates a logged-out store.
    pub fn new(auth: Arc<dyn AuthBackend>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            state: RwLock::new(Session::LoggedOut),
            epoch: AtomicU64::new(0),
            auth,
            tokens,
            observers: ObserverList::new(),
        }
    }

    pub fn subscribe(&self, observer: Weak<dyn ResetObserver>) {
        self.observers.subscribe(observer);
    }

    /// A snapshot of the current session.
    pub fn current(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.current().mode()
    }

    /// Increases on every transition. Work started under one epoch must not
    /// publish results into another.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Authenticates against the backend and enters live mode.
    ///
    /// The token is persisted after the in-memory switch; a failed write only
    /// costs the next resume, so it is logged rather than returned.
    pub async fn login_with_credentials(&self, username: &str, password: &str) -> Result<Session> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(RyoaoError::validation("Enter both a username and a password"));
        }
        if self.current().is_dummy() {
            return Err(RyoaoError::auth("Logging in is disabled while in dummy mode"));
        }

        let epoch = self.epoch();
        let token = self.auth.login(username, password).await.map_err(|err| {
            tracing::warn!(error = %err, "Login request failed");
            RyoaoError::auth(err.user_message(LOGIN_FAILED))
        })?;
        let session = Session::live(token.into_inner())?;

        if self.epoch() != epoch && self.current().is_dummy() {
            return Err(RyoaoError::auth("Dummy mode started while logging in"));
        }

        self.transition(session.clone(), ResetCause::SessionReplaced);
        if let Some(token) = session.token()
            && let Err(err) = self.tokens.save(token)
        {
            tracing::warn!(error = %err, "Failed to persist access token");
        }

        tracing::info!(%username, "Logged in");
        Ok(session)
    }

    /// Restores the session at startup.
    ///
    /// A dummy signal wins over a stored token. Returns `None` when neither
    /// applies and the user has to log in.
    pub fn resume_from_storage(&self, signal: &ModeSignal) -> Result<Option<Session>> {
        if signal.is_dummy() {
            self.enter_dummy_mode();
            return Ok(Some(Session::Dummy));
        }

        let Some(token) = self.tokens.load()? else {
            tracing::debug!("No stored token to resume");
            return Ok(None);
        };

        let session = Session::live(token)?;
        self.transition(session.clone(), ResetCause::SessionReplaced);
        tracing::info!("Resumed live session from stored token");
        Ok(Some(session))
    }

    /// Switches to dummy mode. The stored token is left alone so the live
    /// session can come back once the signal goes away.
    pub fn enter_dummy_mode(&self) {
        if self.current().is_dummy() {
            return;
        }
        self.transition(Session::Dummy, ResetCause::EnteredDummy);
        tracing::info!("Entered dummy mode");
    }

    /// Reacts to the mode trigger at a checkpoint.
    pub fn observe_signal(&self, signal: &ModeSignal) -> Result<Session> {
        if signal.is_dummy() {
            self.enter_dummy_mode();
        } else if self.current().is_dummy() {
            let next = match self.tokens.load()? {
                Some(token) => Session::live(token)?,
                None => Session::LoggedOut,
            };
            tracing::info!(resumed = next.is_live(), "Left dummy mode");
            self.transition(next, ResetCause::LeftDummy);
        }
        Ok(self.current())
    }

    /// Ends the session and forgets the stored token.
    ///
    /// Memory is reset and observers notified first, so a storage failure
    /// never leaves a usable session behind.
    pub fn logout(&self) -> Result<()> {
        self.transition(Session::LoggedOut, ResetCause::LoggedOut);
        tracing::info!("Logged out");
        self.tokens.clear()
    }

    fn transition(&self, next: Session, cause: ResetCause) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = next;
            self.epoch.fetch_add(1, Ordering::SeqCst);
        }
        self.observers.publish(cause);
    }
}
