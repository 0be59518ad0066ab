#![forbid(unsafe_code)]

//! Presentation phases.
//!
//! Each presentation walks `ContentUnloaded → ContentLoaded → Displaying`
//! exactly once. Dismissal resets to `ContentUnloaded` so the next
//! presentation measures from scratch.
//!
//! # Invariants
//!
//! 1. Transitions only move forward by one step; no state is skipped.
//! 2. `reset()` is the only way back to `ContentUnloaded`.

use std::fmt;

/// Where a presentation is in its first-appearance sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Phase {
    /// Nothing measured yet.
    #[default]
    ContentUnloaded,
    /// Detents resolved; the sheet sits at the hidden offset.
    ContentLoaded,
    /// Entrance started; the sheet is on screen.
    Displaying,
}

impl Phase {
    /// The phase that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ContentUnloaded => Some(Self::ContentLoaded),
            Self::ContentLoaded => Some(Self::Displaying),
            Self::Displaying => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ContentUnloaded => "content_unloaded",
            Self::ContentLoaded => "content_loaded",
            Self::Displaying => "displaying",
        })
    }
}

/// Forward-only phase tracker for one presentation session.
#[derive(Debug, Clone, Default)]
pub struct PresentationLifecycle {
    phase: Phase,
}

impl PresentationLifecycle {
    /// Start unloaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `to` if it is the immediate successor of the current phase.
    /// Returns whether the transition happened.
    pub fn advance_to(&mut self, to: Phase) -> bool {
        if self.phase.next() == Some(to) {
            self.phase = to;
            true
        } else {
            false
        }
    }

    /// Back to `ContentUnloaded`. Returns whether the phase changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.phase != Phase::ContentUnloaded;
        self.phase = Phase::ContentUnloaded;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_forward() {
        let mut life = PresentationLifecycle::new();
        assert_eq!(life.phase(), Phase::ContentUnloaded);
        assert!(life.advance_to(Phase::ContentLoaded));
        assert!(life.advance_to(Phase::Displaying));
        assert_eq!(life.phase(), Phase::Displaying);
    }

    #[test]
    fn cannot_skip() {
        let mut life = PresentationLifecycle::new();
        assert!(!life.advance_to(Phase::Displaying));
        assert_eq!(life.phase(), Phase::ContentUnloaded);
    }

    #[test]
    fn cannot_go_back_or_repeat() {
        let mut life = PresentationLifecycle::new();
        life.advance_to(Phase::ContentLoaded);
        assert!(!life.advance_to(Phase::ContentLoaded));
        life.advance_to(Phase::Displaying);
        assert!(!life.advance_to(Phase::ContentLoaded));
        assert!(!life.advance_to(Phase::ContentUnloaded));
    }

    #[test]
    fn reset_returns_to_start() {
        let mut life = PresentationLifecycle::new();
        assert!(!life.reset());
        life.advance_to(Phase::ContentLoaded);
        life.advance_to(Phase::Displaying);
        assert!(life.reset());
        assert_eq!(life.phase(), Phase::ContentUnloaded);
        assert!(life.advance_to(Phase::ContentLoaded));
    }

    #[test]
    fn display_names() {
        assert_eq!(Phase::ContentLoaded.to_string(), "content_loaded");
    }
}
