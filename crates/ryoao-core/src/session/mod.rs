//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: The session state (`Session`, `Mode`)
//! - `event`: Reset notifications for dependents (`ResetCause`, `ResetObserver`, `ObserverList`)
//! - `signal`: The external dummy-mode trigger (`ModeSignal`)

mod event;
mod model;
mod signal;

pub use event::{ObserverList, ResetCause, ResetObserver};
pub use model::{Mode, Session};
pub use signal::{DUMMY_FRAGMENT, ModeSignal};
