//=========================================================================
// Scene Loader
//=========================================================================
//
// Serializes scene transitions and drives them one tick at a time.
//
// Architecture:
//   SceneLoader<H>
//     ├─ host: H                      (visuals + scene operations)
//     ├─ stage: Stage<H::Operation>   (current suspension point)
//     ├─ blockers: BlockerRegistry
//     └─ signals: TransitionSignals
//
// Flow per tick:
//   charge current timer with dt → step stages until one suspends
//
// Flags:
//   is_loading  set at request, cleared right before "scene changed"
//   is_fading   set at request, cleared right before "fade finished"
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::phase::{Timer, TransitionPhase};
use super::request::{TransitionPlan, TransitionRequest};
use super::worker::{LoadWorker, UnloadWorker, WorkStatus};
use crate::core::blocker::{BlockerRef, BlockerRegistry};
use crate::core::config::LoaderConfig;
use crate::core::error::LoaderError;
use crate::core::host::{AsyncOperation, LoadSceneMode, SceneHost};
use crate::core::signals::{ListenerId, Signal, TransitionSignals, TransitionStatus};

//=== Stage ===============================================================

enum Stage<O> {
    Idle,
    FadeIn(Timer),
    Unload(UnloadWorker<O>),
    Load { index: usize, worker: LoadWorker<O> },
    FakeLoading(Timer),
    Activate,
    Blockers { index: usize, notified: bool },
    FadeOut(Timer),
}

impl<O: AsyncOperation> Stage<O> {
    fn phase(&self) -> TransitionPhase {
        match self {
            Stage::Idle => TransitionPhase::Idle,
            Stage::FadeIn(_) => TransitionPhase::FadeIn,
            Stage::Unload(_) => TransitionPhase::Unload,
            Stage::Load { index, .. } => TransitionPhase::Load { index: *index },
            Stage::FakeLoading(_) => TransitionPhase::FakeLoading,
            Stage::Activate => TransitionPhase::Activate,
            Stage::Blockers { index, .. } => TransitionPhase::Blockers { index: *index },
            Stage::FadeOut(_) => TransitionPhase::FadeOut,
        }
    }

    fn timer_mut(&mut self) -> Option<&mut Timer> {
        match self {
            Stage::FadeIn(timer) | Stage::FakeLoading(timer) | Stage::FadeOut(timer) => Some(timer),
            Stage::Load { worker, .. } => worker.timer_mut(),
            _ => None,
        }
    }
}

/// Whether the tick loop keeps stepping or yields until the next tick.
enum Flow {
    Continue,
    Suspend,
}

//=== SceneLoader =========================================================

/// Scene transition controller.
///
/// Owns the host, accepts one transition at a time, and advances it
/// whenever [`tick`](SceneLoader::tick) is called.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use aetheric_scene_loader::prelude::*;
///
/// let host = InMemorySceneHost::new(["Menu", "Town"]).with_loaded_scene("Menu");
/// let config = LoaderConfig::new().with_fade_time(0.0).with_loading_time(0.0);
/// let mut loader = SceneLoader::new(host, config);
///
/// loader
///     .load_scene("Town", Some("Menu"), LoadSceneMode::Additive, true)
///     .unwrap();
///
/// for _ in 0..100 {
///     loader.tick(Duration::from_millis(50));
/// }
///
/// assert!(!loader.is_busy());
/// assert_eq!(loader.current_scene().as_deref(), Some("Town"));
/// ```
pub struct SceneLoader<H: SceneHost> {
    host: H,
    config: LoaderConfig,
    blockers: BlockerRegistry,
    signals: TransitionSignals,
    stage: Stage<H::Operation>,
    plan: Option<TransitionPlan>,
    is_loading: bool,
    is_fading: bool,
    issues: Vec<LoaderError>,
}

impl<H: SceneHost> SceneLoader<H> {
    //--- Construction -----------------------------------------------------

    /// Creates an idle loader and hides the loading screen.
    pub fn new(mut host: H, config: LoaderConfig) -> Self {
        host.set_loading_screen_visible(false);
        info!(
            "Scene loader ready (fade: {}s, loading: {}s)",
            config.fade_time, config.loading_time
        );

        Self {
            host,
            config,
            blockers: BlockerRegistry::new(),
            signals: TransitionSignals::new(),
            stage: Stage::Idle,
            plan: None,
            is_loading: false,
            is_fading: false,
            issues: Vec::new(),
        }
    }

    //--- Requests ---------------------------------------------------------

    /// Starts a transition to a single scene.
    ///
    /// `unload` is removed first if it is loaded. With `set_active` the
    /// scene is made active once loading and the fake delay are done.
    pub fn load_scene(
        &mut self,
        scene: &str,
        unload: Option<&str>,
        mode: LoadSceneMode,
        set_active: bool,
    ) -> Result<(), LoaderError> {
        let mut request = TransitionRequest::single(scene)
            .with_mode(mode)
            .with_set_active(set_active);
        if let Some(unload) = unload {
            request = request.with_unload(unload);
        }
        self.request(request)
    }

    /// Starts a transition to several scenes.
    ///
    /// The first scene replaces the loaded content, the others load
    /// additively. With `set_active`, `active` is made active afterwards.
    pub fn load_scenes(
        &mut self,
        scenes: &[&str],
        unload: Option<&str>,
        set_active: bool,
        active: Option<&str>,
    ) -> Result<(), LoaderError> {
        let mut request = TransitionRequest::multiple(scenes.iter().copied())
            .with_set_active(set_active);
        if let Some(unload) = unload {
            request = request.with_unload(unload);
        }
        if let Some(active) = active {
            request = request.with_active_scene(active);
        }
        self.request(request)
    }

    /// Starts the transition described by `request`.
    ///
    /// Rejected without touching any state when a transition is already
    /// in flight or the request is invalid.
    pub fn request(&mut self, request: TransitionRequest) -> Result<(), LoaderError> {
        if self.is_busy() {
            warn!(
                "Scene is already loading, rejecting request for {:?}",
                request.scenes()
            );
            return Err(LoaderError::Busy);
        }

        let plan = request.plan().map_err(|err| {
            warn!("Rejecting transition request {:?}: {}", request.scenes(), err);
            err
        })?;

        info!(
            "Starting transition to {:?} (unload: {:?})",
            request.scenes(),
            plan.unload
        );

        self.is_loading = true;
        self.is_fading = true;
        self.issues.clear();
        self.plan = Some(plan);

        self.host.set_loading_screen_visible(true);
        self.host.set_loading_animation(true);
        self.stage = Stage::FadeIn(Timer::new(self.config.fade_duration()));

        Ok(())
    }

    //--- Blockers ---------------------------------------------------------

    /// Registers a blocker. `None` and already-registered references are
    /// logged and rejected.
    pub fn add_scene_loading_blocker<B>(&mut self, blocker: B) -> Result<(), LoaderError>
    where
        B: Into<Option<BlockerRef>>,
    {
        self.blockers.add(blocker.into())
    }

    pub fn blocker_count(&self) -> usize {
        self.blockers.len()
    }

    //--- Signals ----------------------------------------------------------

    /// Registers a listener fired once per transition, after blockers
    /// clear and before the fade-out.
    pub fn on_scene_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TransitionStatus) + Send + 'static,
    {
        self.signals.subscribe(Signal::SceneChanged, listener)
    }

    /// Registers a listener fired once the loading screen is hidden.
    pub fn on_fade_finished<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TransitionStatus) + Send + 'static,
    {
        self.signals.subscribe(Signal::FadeFinished, listener)
    }

    /// Removes a listener; removing twice is harmless.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.signals.unsubscribe(id)
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_fading(&self) -> bool {
        self.is_fading
    }

    /// Whether a new request would be rejected.
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_fading
    }

    pub fn phase(&self) -> TransitionPhase {
        self.stage.phase()
    }

    /// The host's active scene.
    pub fn current_scene(&self) -> Option<String> {
        self.host.active_scene()
    }

    /// Sub-steps skipped during the current or last transition.
    pub fn transition_issues(&self) -> &[LoaderError] {
        &self.issues
    }

    pub fn status(&self) -> TransitionStatus {
        TransitionStatus {
            is_loading: self.is_loading,
            is_fading: self.is_fading,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Replaces the timing config. Waits already in progress keep their
    /// original length.
    pub fn set_config(&mut self, config: LoaderConfig) {
        self.config = config;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    //--- Update Loop ------------------------------------------------------

    /// Advances the current transition by one frame of length `dt`.
    ///
    /// Does nothing while idle.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(timer) = self.stage.timer_mut() {
            timer.advance(dt);
        }

        while let Flow::Continue = self.step() {}
    }

    //--- Internal Helpers -------------------------------------------------

    fn step(&mut self) -> Flow {
        let (next, flow) = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Idle => (Stage::Idle, Flow::Suspend),

            Stage::FadeIn(timer) => {
                if timer.is_elapsed() {
                    (self.enter_unload(), Flow::Continue)
                } else {
                    (Stage::FadeIn(timer), Flow::Suspend)
                }
            }

            Stage::Unload(mut worker) => match worker.step(&mut self.host, &mut self.issues) {
                WorkStatus::Pending => (Stage::Unload(worker), Flow::Suspend),
                WorkStatus::Finished => (self.enter_load(0), Flow::Continue),
            },

            Stage::Load { index, mut worker } => {
                match worker.step(&mut self.host, &self.config, &mut self.issues) {
                    WorkStatus::Pending => (Stage::Load { index, worker }, Flow::Suspend),
                    WorkStatus::Finished => (self.enter_load(index + 1), Flow::Continue),
                }
            }

            Stage::FakeLoading(timer) => {
                if timer.is_elapsed() {
                    (Stage::Activate, Flow::Continue)
                } else {
                    (Stage::FakeLoading(timer), Flow::Suspend)
                }
            }

            Stage::Activate => {
                self.activate_requested_scene();
                (Stage::Blockers { index: 0, notified: false }, Flow::Continue)
            }

            Stage::Blockers { index, notified } => match self.blockers.get(index).cloned() {
                Some(blocker) => {
                    if !notified {
                        debug!("Notifying scene loading blocker #{}", index);
                        blocker.on_started_blocking_scene_loading();
                    }
                    if blocker.is_blocking_scene_loading() {
                        (Stage::Blockers { index, notified: true }, Flow::Suspend)
                    } else {
                        (Stage::Blockers { index: index + 1, notified: false }, Flow::Continue)
                    }
                }
                None => {
                    self.finish_loading();
                    (Stage::FadeOut(Timer::new(self.config.fade_duration())), Flow::Continue)
                }
            },

            Stage::FadeOut(timer) => {
                if timer.is_elapsed() {
                    self.finish_fading();
                    (Stage::Idle, Flow::Suspend)
                } else {
                    (Stage::FadeOut(timer), Flow::Suspend)
                }
            }
        };

        self.stage = next;
        flow
    }

    fn enter_unload(&self) -> Stage<H::Operation> {
        match self.plan.as_ref().and_then(|plan| plan.unload.clone()) {
            Some(scene) => Stage::Unload(UnloadWorker::new(scene)),
            None => self.enter_load(0),
        }
    }

    fn enter_load(&self, index: usize) -> Stage<H::Operation> {
        let Some(plan) = self.plan.as_ref() else {
            return Stage::FakeLoading(Timer::new(self.config.loading_duration()));
        };

        match plan.targets.get(index) {
            Some(target) => {
                debug!(
                    "Loading scene {} ({}/{})",
                    target.name,
                    index + 1,
                    plan.targets.len()
                );
                Stage::Load { index, worker: LoadWorker::new(target.clone()) }
            }
            None => Stage::FakeLoading(Timer::new(self.config.loading_duration())),
        }
    }

    fn activate_requested_scene(&mut self) {
        let Some(scene) = self.plan.as_ref().and_then(|plan| plan.activate.clone()) else {
            return;
        };

        if self.host.set_active_scene(&scene) {
            debug!("Scene {} set active", scene);
        } else {
            warn!("Scene {} could not be set active", scene);
        }
    }

    fn finish_loading(&mut self) {
        self.host.set_loading_animation(false);
        self.is_loading = false;

        info!("Scene changed");
        let status = self.status();
        self.signals.emit(Signal::SceneChanged, &status);
    }

    fn finish_fading(&mut self) {
        self.host.set_loading_screen_visible(false);
        self.is_fading = false;
        self.plan = None;

        if self.issues.is_empty() {
            info!("Transition finished");
        } else {
            warn!("Transition finished with {} skipped step(s)", self.issues.len());
        }
        let status = self.status();
        self.signals.emit(Signal::FadeFinished, &status);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
