//=========================================================================
// Scene Host
//=========================================================================
//
// Capability contract between the loader and whatever runtime owns the
// scenes (renderer, ECS world, asset streamer, ...).
//
// The loader never touches scene content itself. It only asks the host
// to show or hide the loading visual, flip the loading animation, and
// add, remove or activate scenes by name.
//
// Components:
// - `SceneHost`: the capability trait
// - `AsyncOperation`: progress handle for asynchronous loads/unloads
// - `memory`: in-memory reference host
//
//=========================================================================

//=== Module Declarations =================================================

pub mod memory;

//=== Public API ==========================================================

pub use memory::{HostCall, InMemoryOperation, InMemorySceneHost};

//=== LoadSceneMode =======================================================

/// How a loaded scene relates to the scenes already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadSceneMode {
    /// Replaces every loaded scene and becomes the active one.
    Single,

    /// Loads alongside the scenes already present.
    #[default]
    Additive,
}

//=== AsyncOperation ======================================================

/// Handle to an in-flight asynchronous scene load or unload.
///
/// Loads report progress in `[0.0, 1.0]`. While activation is withheld
/// a load parks at 0.9 progress
/// ([`MAX_ACTIVATION_THRESHOLD`](crate::core::config::MAX_ACTIVATION_THRESHOLD))
/// and does not complete.
pub trait AsyncOperation: Send {
    /// Advances the operation by one scheduler tick.
    ///
    /// Hosts whose operations progress on their own can leave this empty.
    fn poll(&mut self) {}

    /// Reported progress in `[0.0, 1.0]`.
    fn progress(&self) -> f32;

    /// Whether the operation has fully completed.
    fn is_done(&self) -> bool;

    /// Allows or withholds scene activation once loading has finished.
    fn set_allow_activation(&mut self, allow: bool);
}

//=== SceneHost ===========================================================

/// Runtime services the loader drives during a transition.
///
/// Implemented by the engine integration. All calls happen on the thread
/// that ticks the loader.
pub trait SceneHost {
    /// Operation handle returned by asynchronous loads and unloads.
    type Operation: AsyncOperation;

    //--- Loading Visual ---------------------------------------------------

    /// Shows or hides the loading screen.
    fn set_loading_screen_visible(&mut self, visible: bool);

    /// Sets the loading screen's "loading" animation flag.
    fn set_loading_animation(&mut self, loading: bool);

    //--- Scene Queries ----------------------------------------------------

    /// Name of the active scene, if any.
    fn active_scene(&self) -> Option<String>;

    /// Makes a loaded scene active. Returns `false` if that is not possible.
    fn set_active_scene(&mut self, name: &str) -> bool;

    /// Whether `name` is in the host's build list.
    fn scene_exists(&self, name: &str) -> bool;

    /// Whether `name` is currently loaded.
    fn is_scene_loaded(&self, name: &str) -> bool;

    //--- Scene Operations -------------------------------------------------

    /// Loads a scene synchronously, blocking the caller.
    fn load_scene(&mut self, name: &str, mode: LoadSceneMode);

    /// Starts an asynchronous load. `None` means the host refused.
    fn load_scene_async(&mut self, name: &str, mode: LoadSceneMode) -> Option<Self::Operation>;

    /// Starts an asynchronous unload. `None` means the host refused.
    fn unload_scene_async(&mut self, name: &str) -> Option<Self::Operation>;

    //--- Platform ---------------------------------------------------------

    /// Whether scenes must be loaded synchronously on this target (web).
    fn requires_synchronous_loading(&self) -> bool {
        false
    }
}
