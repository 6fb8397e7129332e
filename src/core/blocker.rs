//=========================================================================
// Scene Loading Blockers
//=========================================================================
//
// Collaborators that can hold back the "scene changed" signal until they
// report readiness (asset pre-warming, save-game hydration, ...).
//
// Registry rules:
// - Insertion order is notification order
// - Duplicates are detected by reference, not by value
// - Entries are never removed
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::error::LoaderError;

//=== SceneLoadingBlocker =================================================

/// An object that may delay scene readiness.
///
/// When a transition reaches its blocker phase, each registered blocker
/// is notified once via [`on_started_blocking_scene_loading`] and then
/// polled every tick until [`is_blocking_scene_loading`] returns `false`.
///
/// Both methods take `&self`; implementers keep their own state behind
/// atomics or locks.
///
/// [`on_started_blocking_scene_loading`]: SceneLoadingBlocker::on_started_blocking_scene_loading
/// [`is_blocking_scene_loading`]: SceneLoadingBlocker::is_blocking_scene_loading
pub trait SceneLoadingBlocker: Send + Sync {
    /// Whether this blocker still holds the transition back.
    fn is_blocking_scene_loading(&self) -> bool;

    /// Called once per transition, right before polling starts.
    fn on_started_blocking_scene_loading(&self);
}

/// Shared handle to a registered blocker.
pub type BlockerRef = Arc<dyn SceneLoadingBlocker>;

/// Reference equality on blocker handles (data pointer only).
pub fn same_blocker(a: &BlockerRef, b: &BlockerRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

//=== BlockerRegistry =====================================================

/// Insertion-ordered set of blockers, compared by reference.
#[derive(Default)]
pub struct BlockerRegistry {
    blockers: Vec<BlockerRef>,
}

impl BlockerRegistry {
    pub fn new() -> Self {
        Self { blockers: Vec::new() }
    }

    /// Appends a blocker.
    ///
    /// A missing blocker or one that is already registered is logged and
    /// rejected; the registry is left unchanged.
    pub fn add(&mut self, blocker: Option<BlockerRef>) -> Result<(), LoaderError> {
        let Some(blocker) = blocker else {
            warn!("Scene loading blocker is missing, ignoring registration");
            return Err(LoaderError::NullBlocker);
        };

        if self.blockers.iter().any(|b| same_blocker(b, &blocker)) {
            warn!("Scene loading blocker is already registered");
            return Err(LoaderError::DuplicateBlocker);
        }

        self.blockers.push(blocker);
        debug!("Registered scene loading blocker #{}", self.blockers.len());
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&BlockerRef> {
        self.blockers.get(index)
    }

    pub fn len(&self) -> usize {
        self.blockers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blockers.is_empty()
    }
}

impl std::fmt::Debug for BlockerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockerRegistry")
            .field("len", &self.blockers.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
