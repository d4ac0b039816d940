//! Reset notifications.
//!
//! Stores that own state other components depend on publish a [`ResetCause`]
//! whenever that state is invalidated. Delivery is synchronous: every
//! observer has reacted before the publishing call returns.

use std::sync::{Mutex, PoisonError, Weak};

/// Why dependents must drop what they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    /// The user logged out; the durable token is gone as well.
    LoggedOut,
    /// The mode trigger forced dummy mode.
    EnteredDummy,
    /// The mode trigger disappeared and dummy mode ended.
    LeftDummy,
    /// A fresh login replaced the previous live session.
    SessionReplaced,
    /// A new analysis result replaced the previous one.
    AnalysisReplaced,
}

/// A component that reacts to reset events.
pub trait ResetObserver: Send + Sync {
    fn on_reset(&self, cause: ResetCause);
}

/// Registered observers of one publisher.
///
/// Observers are held weakly so a subscription never keeps its subscriber
/// alive; dropped observers are pruned on the next publish.
#[derive(Default)]
pub struct ObserverList {
    observers: Mutex<Vec<Weak<dyn ResetObserver>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Weak<dyn ResetObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Delivers `cause` to every live observer, in subscription order.
    pub fn publish(&self, cause: ResetCause) {
        // Snapshot first so observers may subscribe or publish re-entrantly.
        let live: Vec<_> = {
            let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };

        tracing::debug!(?cause, observers = live.len(), "Publishing reset");
        for observer in live {
            observer.on_reset(cause);
        }
    }

    pub fn len(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
