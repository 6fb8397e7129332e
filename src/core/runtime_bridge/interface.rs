//=========================================================================
// Runtime Bridge Interface
//=========================================================================
//
// Message types crossing the thread boundary between a `RuntimeHandle`
// and the loader's logic thread.
//
//   caller ── LoaderCommand ──► logic thread
//   caller ◄── TransitionEvent ── logic thread
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::blocker::BlockerRef;
use crate::core::error::LoaderError;
use crate::core::scene::TransitionRequest;

//=== LoaderCommand =======================================================

/// Commands sent to the logic thread.
pub enum LoaderCommand {
    /// Start a transition.
    Load(TransitionRequest),

    /// Register a blocker.
    AddBlocker(BlockerRef),

    /// Stop the logic thread and hand the loader back.
    Shutdown,
}

impl std::fmt::Debug for LoaderCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(request) => f.debug_tuple("Load").field(request).finish(),
            Self::AddBlocker(_) => f.write_str("AddBlocker(..)"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

//=== TransitionEvent =====================================================

/// Events published by the logic thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    /// A requested transition was accepted and has begun.
    Started { scenes: Vec<String> },

    /// Blockers cleared; new scenes are ready.
    SceneChanged,

    /// Loading screen hidden; the loader is idle again.
    FadeFinished,

    /// A command was rejected.
    Rejected(LoaderError),
}
