//=========================================================================
// Scene Loader Demo
//
// Runs one multi-scene transition on the threaded runtime against the
// in-memory host and prints every event until the fade finishes.
//
//   RUST_LOG=debug cargo run --bin scene_loader_demo
//
//=========================================================================

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aetheric_scene_loader::prelude::*;
use log::info;

//=== CountdownBlocker ====================================================

/// Holds the transition for a fixed number of polls, as a save prompt or
/// a cutscene would.
struct CountdownBlocker {
    remaining: AtomicU32,
}

impl CountdownBlocker {
    fn new(polls: u32) -> Self {
        Self {
            remaining: AtomicU32::new(polls),
        }
    }
}

impl SceneLoadingBlocker for CountdownBlocker {
    fn is_blocking_scene_loading(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn on_started_blocking_scene_loading(&self) {
        info!("Blocker engaged");
    }
}

//=== Entry Point =========================================================

fn main() {
    env_logger::init();

    let host = InMemorySceneHost::new(["Boot", "World", "WorldUI", "WorldAudio"])
        .with_loaded_scene("Boot")
        .with_operation_frames(10);
    let observer = host.clone();

    let config = LoaderConfig::new()
        .with_fade_time(0.25)
        .with_loading_time(0.5);

    let handle = RuntimeBuilder::new()
        .with_tps(60.0)
        .build(SceneLoader::new(host, config))
        .init(|loader| {
            loader.on_scene_changed(|status| info!("Scene changed ({:?})", status));
        })
        .spawn();

    let blocker: BlockerRef = Arc::new(CountdownBlocker::new(20));
    if let Err(e) = handle.add_blocker(blocker) {
        eprintln!("Could not register blocker: {}", e);
        return;
    }

    let request = TransitionRequest::multiple(["World", "WorldUI", "WorldAudio"])
        .with_unload("Boot")
        .with_active_scene("World");
    if let Err(e) = handle.request(request) {
        eprintln!("Could not request transition: {}", e);
        return;
    }

    loop {
        match handle.events().recv_timeout(Duration::from_secs(10)) {
            Ok(event) => {
                println!("{:?}", event);
                if matches!(
                    event,
                    TransitionEvent::FadeFinished | TransitionEvent::Rejected(_)
                ) {
                    break;
                }
            }
            Err(e) => {
                eprintln!("No event received: {}", e);
                break;
            }
        }
    }

    println!("Loaded scenes: {:?}", observer.loaded_scenes());

    match handle.shutdown() {
        Ok(loader) => println!("Active scene: {:?}", loader.current_scene()),
        Err(_) => eprintln!("Loader thread panicked"),
    }
}
