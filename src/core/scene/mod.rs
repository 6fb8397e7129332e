//=========================================================================
// Scene Transition System
//=========================================================================
//
// Fades a loading screen in, swaps scenes through the host, waits out a
// minimum loading time and the registered blockers, then fades out.
//
// Architecture:
//   SceneLoader
//     ├─ request:  TransitionRequest → TransitionPlan (validated up front)
//     ├─ phase:    TransitionPhase state machine, ticked per frame
//     └─ worker:   LoadWorker / UnloadWorker sub-steps
//
// Flow:
//   request() → tick(dt)* → "scene changed" → tick(dt)* → "fade finished"
//
//=========================================================================

//=== Module Declarations =================================================

mod loader;
mod phase;
mod request;
mod worker;

//=== Public API ==========================================================

pub use loader::SceneLoader;
pub use phase::TransitionPhase;
pub use request::{LoadTarget, TransitionRequest};
