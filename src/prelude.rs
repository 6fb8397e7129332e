//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_scene_loader::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime
pub use crate::runtime::{Runtime, RuntimeBuilder, RuntimeHandle};

// Scene transitions
pub use crate::core::scene::{LoadTarget, SceneLoader, TransitionPhase, TransitionRequest};

// Configuration and errors
pub use crate::core::config::LoaderConfig;
pub use crate::core::error::{ConfigError, LoaderError};

// Host contract
pub use crate::core::host::{
    AsyncOperation, HostCall, InMemoryOperation, InMemorySceneHost, LoadSceneMode, SceneHost,
};

// Blockers and signals
pub use crate::core::blocker::{BlockerRef, SceneLoadingBlocker};
pub use crate::core::signals::{ListenerId, Signal, TransitionStatus};

// Runtime messages
pub use crate::core::runtime_bridge::{LoaderCommand, TransitionEvent};
