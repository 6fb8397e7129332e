//=========================================================================
// Transition Phases
//=========================================================================
//
// Named suspension points of a transition, plus the tick-driven timer
// used by the waiting phases.
//
//   Idle → FadeIn → Unload → Load[0..n] → FakeLoading → Activate
//        → Blockers[0..m] → FadeOut → Idle
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== TransitionPhase =====================================================

/// Where a transition currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionPhase {
    /// No transition in flight.
    #[default]
    Idle,

    /// Loading screen shown, waiting out the fade-in.
    FadeIn,

    /// Unloading the requested scene.
    Unload,

    /// Loading the `index`-th target scene.
    Load { index: usize },

    /// Waiting out the artificial minimum loading time.
    FakeLoading,

    /// Setting the requested scene active.
    Activate,

    /// Waiting on the `index`-th registered blocker.
    Blockers { index: usize },

    /// Scene changed, waiting out the fade-out.
    FadeOut,
}

impl TransitionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, TransitionPhase::Idle)
    }
}

//=== Timer ===============================================================

/// Countdown charged explicitly by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timer {
    remaining: Duration,
}

impl Timer {
    pub fn new(duration: Duration) -> Self {
        Self { remaining: duration }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining.is_zero()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
