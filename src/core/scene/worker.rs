//=========================================================================
// Scene Workers
//=========================================================================
//
// Resumable sub-steps of a transition: loading one scene and unloading
// one scene. Each worker is stepped by the loader until it reports
// `Finished`; `Pending` means "suspend until the next tick".
//
// Load worker:
//   Start ─┬─ invalid / unknown / host refused ──────────────► Finished
//          ├─ already loaded (activate if primary) ───────────► Finished
//          ├─ synchronous host: load now ──► Settling ────────► Finished
//          └─ async: Loading (activation withheld)
//                 progress ≥ threshold → allow activation
//                 done ──────────────────► Settling ──────────► Finished
//
// Unload worker:
//   Start ─┬─ empty name / not loaded / host refused ─────────► Finished
//          └─ Unloading ── done ──────────────────────────────► Finished
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::phase::Timer;
use super::request::LoadTarget;
use crate::core::config::{LoaderConfig, MAX_ACTIVATION_THRESHOLD};
use crate::core::error::LoaderError;
use crate::core::host::{AsyncOperation, LoadSceneMode, SceneHost};

//=== WorkStatus ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkStatus {
    Pending,
    Finished,
}

//=== LoadWorker ==========================================================

enum LoadState<O> {
    Start,
    Loading { op: O, activation_allowed: bool },
    Settling(Timer),
    Finished,
}

/// Loads a single [`LoadTarget`].
pub(crate) struct LoadWorker<O> {
    target: LoadTarget,
    state: LoadState<O>,
}

impl<O: AsyncOperation> LoadWorker<O> {
    pub fn new(target: LoadTarget) -> Self {
        Self {
            target,
            state: LoadState::Start,
        }
    }

    /// Timer of the post-load pause, while it runs.
    pub fn timer_mut(&mut self) -> Option<&mut Timer> {
        match &mut self.state {
            LoadState::Settling(timer) => Some(timer),
            _ => None,
        }
    }

    pub fn step<H>(
        &mut self,
        host: &mut H,
        config: &LoaderConfig,
        issues: &mut Vec<LoaderError>,
    ) -> WorkStatus
    where
        H: SceneHost<Operation = O>,
    {
        loop {
            let (next, status) = match std::mem::replace(&mut self.state, LoadState::Finished) {
                LoadState::Start => {
                    let next = self.start(host, config, issues);
                    // Give a freshly started operation one tick before polling
                    let status = match next {
                        LoadState::Loading { .. } => Some(WorkStatus::Pending),
                        _ => None,
                    };
                    (next, status)
                }

                LoadState::Loading { mut op, activation_allowed } => {
                    op.poll();
                    if op.is_done() {
                        debug!("Scene {} finished loading", self.target.name);
                        (LoadState::Settling(Timer::new(config.post_load_duration())), None)
                    } else if !activation_allowed && op.progress() >= activation_threshold(config) {
                        debug!(
                            "Scene {} reached {:.2} progress, allowing activation",
                            self.target.name,
                            op.progress()
                        );
                        op.set_allow_activation(true);
                        (
                            LoadState::Loading { op, activation_allowed: true },
                            Some(WorkStatus::Pending),
                        )
                    } else {
                        (LoadState::Loading { op, activation_allowed }, Some(WorkStatus::Pending))
                    }
                }

                LoadState::Settling(timer) => {
                    if timer.is_elapsed() {
                        (LoadState::Finished, None)
                    } else {
                        (LoadState::Settling(timer), Some(WorkStatus::Pending))
                    }
                }

                LoadState::Finished => (LoadState::Finished, Some(WorkStatus::Finished)),
            };

            self.state = next;
            if let Some(status) = status {
                return status;
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn start<H>(
        &self,
        host: &mut H,
        config: &LoaderConfig,
        issues: &mut Vec<LoaderError>,
    ) -> LoadState<O>
    where
        H: SceneHost<Operation = O>,
    {
        let LoadTarget { name, mode } = &self.target;

        if name.is_empty() {
            error!("Scene name is empty, skipping load");
            issues.push(LoaderError::EmptySceneName);
            return LoadState::Finished;
        }

        if !host.scene_exists(name) {
            let err = LoaderError::SceneNotFound(name.clone());
            error!("{}", err);
            issues.push(err);
            return LoadState::Finished;
        }

        if host.is_scene_loaded(name) {
            if *mode == LoadSceneMode::Single {
                if host.set_active_scene(name) {
                    debug!("Scene {} already loaded, made it active", name);
                } else {
                    warn!("Scene {} already loaded but could not be made active", name);
                }
            } else {
                debug!("Scene {} already loaded, reusing it", name);
            }
            return LoadState::Finished;
        }

        if host.requires_synchronous_loading() {
            debug!("Loading scene {} synchronously ({:?})", name, mode);
            host.load_scene(name, *mode);
            return LoadState::Settling(Timer::new(config.post_load_duration()));
        }

        match host.load_scene_async(name, *mode) {
            Some(mut op) => {
                debug!("Loading scene {} asynchronously ({:?})", name, mode);
                op.set_allow_activation(false);
                LoadState::Loading { op, activation_allowed: false }
            }
            None => {
                let err = LoaderError::OperationUnavailable { scene: name.clone() };
                error!("{}", err);
                issues.push(err);
                LoadState::Finished
            }
        }
    }
}

// Configs built field by field skip validation.
fn activation_threshold(config: &LoaderConfig) -> f32 {
    config.activation_threshold.min(MAX_ACTIVATION_THRESHOLD)
}

//=== UnloadWorker ========================================================

enum UnloadState<O> {
    Start,
    Unloading(O),
    Finished,
}

/// Unloads a single scene by name, if it is loaded.
pub(crate) struct UnloadWorker<O> {
    scene: String,
    state: UnloadState<O>,
}

impl<O: AsyncOperation> UnloadWorker<O> {
    pub fn new(scene: String) -> Self {
        Self {
            scene,
            state: UnloadState::Start,
        }
    }

    pub fn step<H>(&mut self, host: &mut H, issues: &mut Vec<LoaderError>) -> WorkStatus
    where
        H: SceneHost<Operation = O>,
    {
        match std::mem::replace(&mut self.state, UnloadState::Finished) {
            UnloadState::Start => {
                if self.scene.is_empty() || !host.is_scene_loaded(&self.scene) {
                    debug!("Scene {:?} is not loaded, nothing to unload", self.scene);
                    return WorkStatus::Finished;
                }

                match host.unload_scene_async(&self.scene) {
                    Some(op) => {
                        debug!("Unloading scene {}", self.scene);
                        self.state = UnloadState::Unloading(op);
                        WorkStatus::Pending
                    }
                    None => {
                        let err = LoaderError::OperationUnavailable { scene: self.scene.clone() };
                        error!("{}", err);
                        issues.push(err);
                        WorkStatus::Finished
                    }
                }
            }

            UnloadState::Unloading(mut op) => {
                op.poll();
                if op.is_done() {
                    debug!("Scene {} unloaded", self.scene);
                    WorkStatus::Finished
                } else {
                    self.state = UnloadState::Unloading(op);
                    WorkStatus::Pending
                }
            }

            UnloadState::Finished => WorkStatus::Finished,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::{HostCall, InMemorySceneHost};
    use std::time::Duration;

    fn target(name: &str, mode: LoadSceneMode) -> LoadTarget {
        LoadTarget { name: name.to_string(), mode }
    }

    fn run_load(
        host: &mut InMemorySceneHost,
        worker: &mut LoadWorker<crate::core::host::InMemoryOperation>,
        config: &LoaderConfig,
        issues: &mut Vec<LoaderError>,
    ) -> usize {
        for ticks in 1..=100 {
            if let Some(timer) = worker.timer_mut() {
                timer.advance(Duration::from_millis(50));
            }
            if worker.step(host, config, issues) == WorkStatus::Finished {
                return ticks;
            }
        }
        panic!("load worker never finished");
    }

    //=====================================================================
    // Load Worker Tests
    //=====================================================================

    #[test]
    fn async_load_withholds_then_allows_activation() {
        let mut host = InMemorySceneHost::new(["Town"]);
        let config = LoaderConfig::default();
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("Town", LoadSceneMode::Additive));

        run_load(&mut host, &mut worker, &config, &mut issues);

        assert!(issues.is_empty());
        assert!(host.is_scene_loaded("Town"));

        let calls = host.calls();
        let withheld = calls
            .iter()
            .position(|c| *c == HostCall::ActivationWithheld("Town".into()))
            .unwrap();
        let allowed = calls
            .iter()
            .position(|c| *c == HostCall::ActivationAllowed("Town".into()))
            .unwrap();
        let completed = calls
            .iter()
            .position(|c| *c == HostCall::LoadCompleted("Town".into()))
            .unwrap();
        assert!(withheld < allowed && allowed < completed);
    }

    #[test]
    fn unvalidated_high_threshold_still_releases_activation() {
        let mut host = InMemorySceneHost::new(["Town"]);
        let config = LoaderConfig {
            activation_threshold: 0.95,
            ..LoaderConfig::default()
        };
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("Town", LoadSceneMode::Additive));

        run_load(&mut host, &mut worker, &config, &mut issues);

        assert!(host.is_scene_loaded("Town"));
        assert!(host
            .calls()
            .contains(&HostCall::ActivationAllowed("Town".into())));
    }

    #[test]
    fn synchronous_host_never_loads_async() {
        let mut host = InMemorySceneHost::new(["Town"]).with_synchronous_loading(true);
        let config = LoaderConfig::default();
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("Town", LoadSceneMode::Single));

        run_load(&mut host, &mut worker, &config, &mut issues);

        let calls = host.calls();
        assert!(calls.iter().any(|c| matches!(c, HostCall::LoadSync { .. })));
        assert!(!calls.iter().any(|c| matches!(c, HostCall::LoadAsync { .. })));
        assert_eq!(host.active_scene().as_deref(), Some("Town"));
    }

    #[test]
    fn unknown_scene_is_recorded_and_skipped() {
        let mut host = InMemorySceneHost::new(["Town"]);
        let config = LoaderConfig::default();
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("Nowhere", LoadSceneMode::Additive));

        assert_eq!(run_load(&mut host, &mut worker, &config, &mut issues), 1);
        assert_eq!(issues, vec![LoaderError::SceneNotFound("Nowhere".into())]);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn empty_name_is_recorded_and_skipped() {
        let mut host = InMemorySceneHost::new(["Town"]);
        let config = LoaderConfig::default();
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("", LoadSceneMode::Additive));

        run_load(&mut host, &mut worker, &config, &mut issues);
        assert_eq!(issues, vec![LoaderError::EmptySceneName]);
    }

    #[test]
    fn refused_operation_is_recorded_and_skipped() {
        let mut host = InMemorySceneHost::new(["Town"]).with_unavailable_operations("Town");
        let config = LoaderConfig::default();
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("Town", LoadSceneMode::Additive));

        run_load(&mut host, &mut worker, &config, &mut issues);
        assert_eq!(
            issues,
            vec![LoaderError::OperationUnavailable { scene: "Town".into() }]
        );
        assert!(!host.is_scene_loaded("Town"));
    }

    #[test]
    fn already_loaded_additive_scene_is_reused_without_activation() {
        let mut host = InMemorySceneHost::new(["Menu", "Town"])
            .with_loaded_scene("Menu")
            .with_loaded_scene("Town");
        host.clear_calls();
        let config = LoaderConfig::default();
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("Town", LoadSceneMode::Additive));

        run_load(&mut host, &mut worker, &config, &mut issues);

        assert!(host.calls().is_empty());
        assert_eq!(host.active_scene().as_deref(), Some("Menu"));
    }

    #[test]
    fn already_loaded_primary_scene_is_activated() {
        let mut host = InMemorySceneHost::new(["Menu", "Town"])
            .with_loaded_scene("Menu")
            .with_loaded_scene("Town");
        host.clear_calls();
        let config = LoaderConfig::default();
        let mut issues = Vec::new();
        let mut worker = LoadWorker::new(target("Town", LoadSceneMode::Single));

        run_load(&mut host, &mut worker, &config, &mut issues);

        assert_eq!(host.calls(), vec![HostCall::SetActive("Town".into())]);
        assert_eq!(host.loaded_scenes(), vec!["Menu", "Town"]);
    }

    //=====================================================================
    // Unload Worker Tests
    //=====================================================================

    #[test]
    fn unload_of_missing_scene_is_a_no_op() {
        let mut host = InMemorySceneHost::new(["Menu"]);
        let mut issues = Vec::new();
        let mut worker = UnloadWorker::new("Menu".to_string());

        assert_eq!(worker.step(&mut host, &mut issues), WorkStatus::Finished);
        assert!(host.calls().is_empty());
        assert!(issues.is_empty());
    }

    #[test]
    fn unload_suspends_until_done() {
        let mut host = InMemorySceneHost::new(["Menu"])
            .with_loaded_scene("Menu")
            .with_operation_frames(2);
        let mut issues = Vec::new();
        let mut worker = UnloadWorker::new("Menu".to_string());

        assert_eq!(worker.step(&mut host, &mut issues), WorkStatus::Pending);
        assert_eq!(worker.step(&mut host, &mut issues), WorkStatus::Pending);
        assert_eq!(worker.step(&mut host, &mut issues), WorkStatus::Finished);
        assert!(!host.is_scene_loaded("Menu"));
    }
}
