//=========================================================================
// In-Memory Scene Host
//=========================================================================
//
// Reference `SceneHost` with no engine behind it.
//
// Scenes are plain names. Asynchronous operations complete after a fixed
// number of polls, and loads mimic engine behaviour by stalling at 0.9
// progress while activation is withheld. Every call the loader makes is
// recorded so ordering can be asserted.
//
// Architecture:
//   InMemorySceneHost ──┐
//                       ├─► Arc<Mutex<HostState>>  (loaded, active, calls)
//   InMemoryOperation ──┘
//
// Clones of the host share the same state, so a clone kept outside the
// loader observes the transition as it happens.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

//=== Internal Dependencies ===============================================

use super::{AsyncOperation, LoadSceneMode, SceneHost};

//=== HostCall ============================================================

/// A call observed by the in-memory host, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    LoadingScreen(bool),
    LoadingAnimation(bool),
    SetActive(String),
    LoadSync { scene: String, mode: LoadSceneMode },
    LoadAsync { scene: String, mode: LoadSceneMode },
    UnloadAsync(String),
    ActivationWithheld(String),
    ActivationAllowed(String),
    LoadCompleted(String),
    UnloadCompleted(String),
}

//=== HostState ===========================================================

#[derive(Debug, Default)]
struct HostState {
    build_list: Vec<String>,
    loaded: Vec<String>,
    active: Option<String>,
    loading_screen_visible: bool,
    loading_animation: bool,
    calls: Vec<HostCall>,
}

impl HostState {
    fn apply_load(&mut self, scene: &str, mode: LoadSceneMode) {
        match mode {
            LoadSceneMode::Single => {
                self.loaded.clear();
                self.loaded.push(scene.to_string());
                self.active = Some(scene.to_string());
            }
            LoadSceneMode::Additive => {
                if !self.loaded.iter().any(|s| s == scene) {
                    self.loaded.push(scene.to_string());
                }
                if self.active.is_none() {
                    self.active = Some(scene.to_string());
                }
            }
        }
    }

    fn apply_unload(&mut self, scene: &str) {
        self.loaded.retain(|s| s != scene);
        if self.active.as_deref() == Some(scene) {
            self.active = self.loaded.first().cloned();
        }
    }
}

fn lock(state: &Mutex<HostState>) -> MutexGuard<'_, HostState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

//=== InMemorySceneHost ===================================================

/// Scene host backed by an in-memory scene table.
///
/// # Default Values
///
/// - **Operation frames**: 2 polls per asynchronous operation
/// - **Synchronous loading**: off
#[derive(Debug, Clone)]
pub struct InMemorySceneHost {
    state: Arc<Mutex<HostState>>,
    synchronous: bool,
    operation_frames: u32,
    unavailable: HashSet<String>,
}

impl InMemorySceneHost {
    //--- Construction -----------------------------------------------------

    /// Creates a host whose build list holds `scenes`. Nothing is loaded.
    pub fn new<I, S>(scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = HostState {
            build_list: scenes.into_iter().map(Into::into).collect(),
            ..HostState::default()
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            synchronous: false,
            operation_frames: 2,
            unavailable: HashSet::new(),
        }
    }

    /// Marks a scene as already loaded. The first one becomes active.
    pub fn with_loaded_scene(self, scene: &str) -> Self {
        lock(&self.state).apply_load(scene, LoadSceneMode::Additive);
        self
    }

    /// Forces synchronous loading, as on the web target.
    pub fn with_synchronous_loading(mut self, synchronous: bool) -> Self {
        self.synchronous = synchronous;
        self
    }

    /// Sets how many polls an asynchronous operation takes.
    pub fn with_operation_frames(mut self, frames: u32) -> Self {
        self.operation_frames = frames;
        self
    }

    /// Makes asynchronous operations on `scene` return no handle.
    pub fn with_unavailable_operations(mut self, scene: &str) -> Self {
        self.unavailable.insert(scene.to_string());
        self
    }

    //--- Inspection -------------------------------------------------------

    /// Loaded scenes in load order.
    pub fn loaded_scenes(&self) -> Vec<String> {
        lock(&self.state).loaded.clone()
    }

    pub fn is_loading_screen_visible(&self) -> bool {
        lock(&self.state).loading_screen_visible
    }

    pub fn is_loading_animation_playing(&self) -> bool {
        lock(&self.state).loading_animation
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<HostCall> {
        lock(&self.state).calls.clone()
    }

    /// Forgets recorded calls, keeping scene state.
    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    //--- Internal Helpers -------------------------------------------------

    fn start_operation(&self, kind: OperationKind) -> InMemoryOperation {
        InMemoryOperation {
            state: Arc::clone(&self.state),
            kind,
            frames_total: self.operation_frames,
            frames_elapsed: 0,
            allow_activation: true,
            done: false,
        }
    }
}

impl SceneHost for InMemorySceneHost {
    type Operation = InMemoryOperation;

    fn set_loading_screen_visible(&mut self, visible: bool) {
        let mut state = lock(&self.state);
        state.loading_screen_visible = visible;
        state.calls.push(HostCall::LoadingScreen(visible));
    }

    fn set_loading_animation(&mut self, loading: bool) {
        let mut state = lock(&self.state);
        state.loading_animation = loading;
        state.calls.push(HostCall::LoadingAnimation(loading));
    }

    fn active_scene(&self) -> Option<String> {
        lock(&self.state).active.clone()
    }

    fn set_active_scene(&mut self, name: &str) -> bool {
        let mut state = lock(&self.state);
        if !state.loaded.iter().any(|s| s == name) {
            return false;
        }
        state.active = Some(name.to_string());
        state.calls.push(HostCall::SetActive(name.to_string()));
        true
    }

    fn scene_exists(&self, name: &str) -> bool {
        lock(&self.state).build_list.iter().any(|s| s == name)
    }

    fn is_scene_loaded(&self, name: &str) -> bool {
        lock(&self.state).loaded.iter().any(|s| s == name)
    }

    fn load_scene(&mut self, name: &str, mode: LoadSceneMode) {
        let mut state = lock(&self.state);
        state.calls.push(HostCall::LoadSync { scene: name.to_string(), mode });
        state.apply_load(name, mode);
        state.calls.push(HostCall::LoadCompleted(name.to_string()));
    }

    fn load_scene_async(&mut self, name: &str, mode: LoadSceneMode) -> Option<Self::Operation> {
        lock(&self.state).calls.push(HostCall::LoadAsync { scene: name.to_string(), mode });

        if self.unavailable.contains(name) {
            debug!("In-memory host refusing load of {}", name);
            return None;
        }

        Some(self.start_operation(OperationKind::Load {
            scene: name.to_string(),
            mode,
        }))
    }

    fn unload_scene_async(&mut self, name: &str) -> Option<Self::Operation> {
        lock(&self.state).calls.push(HostCall::UnloadAsync(name.to_string()));

        if self.unavailable.contains(name) {
            debug!("In-memory host refusing unload of {}", name);
            return None;
        }

        Some(self.start_operation(OperationKind::Unload {
            scene: name.to_string(),
        }))
    }

    fn requires_synchronous_loading(&self) -> bool {
        self.synchronous
    }
}

//=== InMemoryOperation ===================================================

#[derive(Debug)]
enum OperationKind {
    Load { scene: String, mode: LoadSceneMode },
    Unload { scene: String },
}

/// Frame-counted operation produced by [`InMemorySceneHost`].
///
/// Loads report `0.9 * fraction` until they complete, and only complete
/// once activation is allowed. Unloads report the plain fraction.
#[derive(Debug)]
pub struct InMemoryOperation {
    state: Arc<Mutex<HostState>>,
    kind: OperationKind,
    frames_total: u32,
    frames_elapsed: u32,
    allow_activation: bool,
    done: bool,
}

impl InMemoryOperation {
    fn scene(&self) -> &str {
        match &self.kind {
            OperationKind::Load { scene, .. } | OperationKind::Unload { scene } => scene,
        }
    }
}

impl AsyncOperation for InMemoryOperation {
    fn poll(&mut self) {
        if self.done {
            return;
        }

        if self.frames_elapsed < self.frames_total {
            self.frames_elapsed += 1;
        }
        if self.frames_elapsed < self.frames_total {
            return;
        }

        match &self.kind {
            OperationKind::Load { scene, mode } => {
                if !self.allow_activation {
                    return;
                }
                let mut state = lock(&self.state);
                state.apply_load(scene, *mode);
                state.calls.push(HostCall::LoadCompleted(scene.clone()));
            }
            OperationKind::Unload { scene } => {
                let mut state = lock(&self.state);
                state.apply_unload(scene);
                state.calls.push(HostCall::UnloadCompleted(scene.clone()));
            }
        }

        self.done = true;
    }

    fn progress(&self) -> f32 {
        if self.done {
            return 1.0;
        }

        let fraction = if self.frames_total == 0 {
            1.0
        } else {
            self.frames_elapsed as f32 / self.frames_total as f32
        };

        match self.kind {
            OperationKind::Load { .. } => 0.9 * fraction,
            OperationKind::Unload { .. } => fraction,
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn set_allow_activation(&mut self, allow: bool) {
        self.allow_activation = allow;

        let call = if allow {
            HostCall::ActivationAllowed(self.scene().to_string())
        } else {
            HostCall::ActivationWithheld(self.scene().to_string())
        };
        lock(&self.state).calls.push(call);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
