//=========================================================================
// Aetheric Scene Loader - Library Root
//
// Engine-agnostic scene transitions: fade a loading screen in, swap
// scenes through a host, wait for blockers, fade back out.
//
// Responsibilities:
// - Expose the transition controller (`SceneLoader`) and its host trait
// - Offer a threaded runtime for callers that do not own a frame loop
// - Keep the logic-thread plumbing out of the public surface
//
// Typical usage:
// ```no_run
// use aetheric_scene_loader::prelude::*;
// use std::time::Duration;
//
// let host = InMemorySceneHost::new(["Menu", "Town"]);
// let mut loader = SceneLoader::new(host, LoaderConfig::default());
//
// loader.load_scene("Town", Some("Menu"), LoadSceneMode::Additive, true).unwrap();
// while loader.is_busy() {
//     loader.tick(Duration::from_millis(16));
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the loader, its host contract, blockers, signals and
// configuration. Most applications only need the `prelude`.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `runtime` wraps a loader in a logic thread driven over channels.
//
mod runtime;

//--- Public Exports ------------------------------------------------------
pub use runtime::{Runtime, RuntimeBuilder, RuntimeHandle};
