//=========================================================================
// Transition Flow Tests
//
// End-to-end behaviour of the public API: the loader driven by hand and
// the loader driven by the threaded runtime.
//
//=========================================================================

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aetheric_scene_loader::prelude::*;

const FRAME: Duration = Duration::from_millis(20);
const MAX_TICKS: usize = 2_000;

//=== Helpers =============================================================

fn quick_config() -> LoaderConfig {
    LoaderConfig::new()
        .with_fade_time(0.1)
        .with_loading_time(0.2)
        .with_post_load_delay(0.05)
}

fn run_until_idle(loader: &mut SceneLoader<InMemorySceneHost>) {
    for _ in 0..MAX_TICKS {
        loader.tick(FRAME);
        if !loader.is_busy() {
            return;
        }
    }
    panic!("transition never finished, stuck in {:?}", loader.phase());
}

struct FixedBlocker {
    blocking: AtomicBool,
}

impl SceneLoadingBlocker for FixedBlocker {
    fn is_blocking_scene_loading(&self) -> bool {
        self.blocking.load(Ordering::SeqCst)
    }

    fn on_started_blocking_scene_loading(&self) {}
}

struct CountingBlocker {
    polls_left: AtomicUsize,
    notified: AtomicUsize,
}

impl SceneLoadingBlocker for CountingBlocker {
    fn is_blocking_scene_loading(&self) -> bool {
        self.polls_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn on_started_blocking_scene_loading(&self) {
        self.notified.fetch_add(1, Ordering::SeqCst);
    }
}

//=========================================================================
// Request Handling
//=========================================================================

#[test]
fn requests_during_a_transition_are_rejected_without_side_effects() {
    let host = InMemorySceneHost::new(["Menu", "Town", "Castle"]).with_loaded_scene("Menu");
    let observer = host.clone();
    let mut loader = SceneLoader::new(host, quick_config());

    loader.request(TransitionRequest::single("Town")).unwrap();
    loader.tick(FRAME);
    let phase = loader.phase();
    let calls = observer.calls().len();

    assert_eq!(
        loader.request(TransitionRequest::single("Castle")),
        Err(LoaderError::Busy)
    );
    assert_eq!(loader.phase(), phase);
    assert_eq!(observer.calls().len(), calls);

    // Still rejected after "scene changed", while only fading
    let mut saw_fading_only = false;
    for _ in 0..MAX_TICKS {
        loader.tick(FRAME);
        if !loader.is_loading() && loader.is_fading() {
            saw_fading_only = true;
            assert_eq!(
                loader.request(TransitionRequest::single("Castle")),
                Err(LoaderError::Busy)
            );
        }
        if !loader.is_busy() {
            break;
        }
    }

    assert!(saw_fading_only);
    assert!(!observer.loaded_scenes().contains(&"Castle".to_string()));
}

//=========================================================================
// Blockers
//=========================================================================

#[test]
fn blockers_are_notified_in_registration_order() {
    let host = InMemorySceneHost::new(["Menu", "Town"]);
    let mut loader = SceneLoader::new(host, quick_config());

    let first = Arc::new(CountingBlocker {
        polls_left: AtomicUsize::new(3),
        notified: AtomicUsize::new(0),
    });
    let second = Arc::new(CountingBlocker {
        polls_left: AtomicUsize::new(3),
        notified: AtomicUsize::new(0),
    });
    loader.add_scene_loading_blocker(Some(first.clone() as BlockerRef)).unwrap();
    loader.add_scene_loading_blocker(Some(second.clone() as BlockerRef)).unwrap();

    loader.request(TransitionRequest::single("Town")).unwrap();

    // Second blocker waits until the first one clears
    while loader.phase() != (TransitionPhase::Blockers { index: 1 }) {
        if first.notified.load(Ordering::SeqCst) == 1 {
            assert_eq!(second.notified.load(Ordering::SeqCst), 0);
        }
        loader.tick(FRAME);
    }

    run_until_idle(&mut loader);
    assert_eq!(first.notified.load(Ordering::SeqCst), 1);
    assert_eq!(second.notified.load(Ordering::SeqCst), 1);
}

//=========================================================================
// Multi-Scene Loading
//=========================================================================

#[test]
fn multi_scene_load_keeps_primary_and_additive_scenes() {
    let host = InMemorySceneHost::new(["Menu", "A", "B"]).with_loaded_scene("Menu");
    let observer = host.clone();
    let mut loader = SceneLoader::new(host, quick_config());

    loader.load_scenes(&["A", "B"], None, false, None).unwrap();
    run_until_idle(&mut loader);

    assert_eq!(observer.loaded_scenes(), vec!["A", "B"]);
    assert_eq!(loader.current_scene().as_deref(), Some("A"));
    assert!(observer.calls().contains(&HostCall::LoadAsync {
        scene: "A".to_string(),
        mode: LoadSceneMode::Single,
    }));
    assert!(observer.calls().contains(&HostCall::LoadAsync {
        scene: "B".to_string(),
        mode: LoadSceneMode::Additive,
    }));
    assert!(loader.transition_issues().is_empty());
}

#[test]
fn already_loaded_additive_scene_is_not_loaded_again() {
    let host = InMemorySceneHost::new(["A", "B"])
        .with_loaded_scene("A")
        .with_loaded_scene("B");
    let observer = host.clone();
    let mut loader = SceneLoader::new(host, quick_config());

    loader
        .load_scene("B", None, LoadSceneMode::Additive, false)
        .unwrap();
    run_until_idle(&mut loader);

    assert!(!observer
        .calls()
        .iter()
        .any(|c| matches!(c, HostCall::LoadAsync { .. } | HostCall::LoadSync { .. })));
    assert_eq!(observer.loaded_scenes(), vec!["A", "B"]);
    assert_eq!(loader.current_scene().as_deref(), Some("A"));
}

//=========================================================================
// Host Interaction
//=========================================================================

#[test]
fn activation_is_withheld_until_threshold() {
    let host = InMemorySceneHost::new(["Town"]).with_operation_frames(5);
    let observer = host.clone();
    let mut loader = SceneLoader::new(host, quick_config());

    loader.request(TransitionRequest::single("Town")).unwrap();
    run_until_idle(&mut loader);

    let calls = observer.calls();
    let position = |call: &HostCall| calls.iter().position(|c| c == call).unwrap();
    let withheld = position(&HostCall::ActivationWithheld("Town".to_string()));
    let allowed = position(&HostCall::ActivationAllowed("Town".to_string()));
    let completed = position(&HostCall::LoadCompleted("Town".to_string()));

    assert!(withheld < allowed);
    assert!(allowed < completed);
}

#[test]
fn synchronous_host_never_sees_async_loads() {
    let host = InMemorySceneHost::new(["Town", "Castle"]).with_synchronous_loading(true);
    let observer = host.clone();
    let mut loader = SceneLoader::new(host, quick_config());

    loader.load_scenes(&["Town", "Castle"], None, false, None).unwrap();
    run_until_idle(&mut loader);

    let calls = observer.calls();
    assert!(!calls.iter().any(|c| matches!(c, HostCall::LoadAsync { .. })));
    assert!(calls.contains(&HostCall::LoadSync {
        scene: "Town".to_string(),
        mode: LoadSceneMode::Single,
    }));
    assert_eq!(observer.loaded_scenes(), vec!["Town", "Castle"]);
}

#[test]
fn failed_sub_steps_are_recorded_and_skipped() {
    let host = InMemorySceneHost::new(["Town", "Broken"]).with_unavailable_operations("Broken");
    let mut loader = SceneLoader::new(host, quick_config());

    loader
        .load_scenes(&["Town", "Missing", "Broken"], None, false, None)
        .unwrap();
    run_until_idle(&mut loader);

    assert_eq!(
        loader.transition_issues(),
        &[
            LoaderError::SceneNotFound("Missing".to_string()),
            LoaderError::OperationUnavailable {
                scene: "Broken".to_string()
            },
        ]
    );
    assert_eq!(loader.host().loaded_scenes(), vec!["Town"]);
    assert!(!loader.is_busy());
}

//=========================================================================
// Configuration
//=========================================================================

#[test]
fn toml_config_drives_the_loader() {
    let config = LoaderConfig::from_toml_str("fade_time = 0.0\nloading_time = 0.0\n").unwrap();
    let host = InMemorySceneHost::new(["Town"]).with_synchronous_loading(true);
    let mut loader = SceneLoader::new(host, config.with_post_load_delay(0.0));

    loader.request(TransitionRequest::single("Town")).unwrap();
    loader.tick(FRAME);

    assert!(!loader.is_busy());
    assert_eq!(loader.current_scene().as_deref(), Some("Town"));
}

//=========================================================================
// Runtime
//=========================================================================

#[test]
fn runtime_publishes_events_in_order() {
    let host = InMemorySceneHost::new(["Menu", "Town"]).with_loaded_scene("Menu");
    let loader = SceneLoader::new(
        host,
        LoaderConfig::new()
            .with_fade_time(0.05)
            .with_loading_time(0.05)
            .with_post_load_delay(0.0),
    );
    let handle = RuntimeBuilder::new().with_tps(200.0).build(loader).spawn();
    let wait = Duration::from_secs(5);

    handle
        .request(TransitionRequest::single("Town").with_unload("Menu"))
        .unwrap();
    handle.request(TransitionRequest::single("Menu")).unwrap();

    assert_eq!(
        handle.events().recv_timeout(wait).unwrap(),
        TransitionEvent::Started {
            scenes: vec!["Town".to_string()]
        }
    );
    assert_eq!(
        handle.events().recv_timeout(wait).unwrap(),
        TransitionEvent::Rejected(LoaderError::Busy)
    );
    assert_eq!(
        handle.events().recv_timeout(wait).unwrap(),
        TransitionEvent::SceneChanged
    );
    assert_eq!(
        handle.events().recv_timeout(wait).unwrap(),
        TransitionEvent::FadeFinished
    );

    let loader = handle.shutdown().unwrap();
    assert_eq!(loader.current_scene().as_deref(), Some("Town"));
}

#[test]
fn runtime_reports_duplicate_blockers() {
    let host = InMemorySceneHost::new(["Town"]);
    let handle = RuntimeBuilder::new()
        .build(SceneLoader::new(host, quick_config()))
        .spawn();
    let blocker: BlockerRef = Arc::new(FixedBlocker {
        blocking: AtomicBool::new(false),
    });

    handle.add_blocker(Arc::clone(&blocker)).unwrap();
    handle.add_blocker(blocker).unwrap();

    assert_eq!(
        handle.events().recv_timeout(Duration::from_secs(5)).unwrap(),
        TransitionEvent::Rejected(LoaderError::DuplicateBlocker)
    );

    let loader = handle.shutdown().unwrap();
    assert_eq!(loader.blocker_count(), 1);
}
