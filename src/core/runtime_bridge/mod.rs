//=========================================================================
// Runtime Bridge
//=========================================================================
//
// Bridges callers on any thread with the loader's logic thread.
//
// The loader and its host never leave the logic thread. Callers talk to
// it only through commands and events carried by crossbeam channels.
//
// Components:
// - `interface`: command and event types (the contract)
// - `command_collector`: logic-side command draining
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod command_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub use interface::{LoaderCommand, TransitionEvent};

//=== Internal API ========================================================

pub(crate) use command_collector::{CommandCollector, TickControl};
