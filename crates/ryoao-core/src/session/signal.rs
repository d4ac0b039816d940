//! The external dummy-mode trigger.

/// Location fragment that forces dummy mode.
pub const DUMMY_FRAGMENT: &str = "#dummy";

/// A snapshot of the external mode-trigger signal.
///
/// The signal is observed at defined checkpoints (startup and explicit
/// mode-change events) rather than continuously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSignal {
    fragment: Option<String>,
}

impl ModeSignal {
    /// No trigger present.
    pub fn none() -> Self {
        Self::default()
    }

    /// The trigger, as if the location fragment were `#dummy`.
    pub fn dummy() -> Self {
        Self::from_fragment(DUMMY_FRAGMENT)
    }

    pub fn from_fragment(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        Self {
            fragment: (!fragment.trim().is_empty()).then_some(fragment),
        }
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Whether the signal requests dummy mode.
    pub fn is_dummy(&self) -> bool {
        self.fragment
            .as_deref()
            .map(str::trim)
            .is_some_and(|f| f == DUMMY_FRAGMENT || f == &DUMMY_FRAGMENT[1..])
    }
}
