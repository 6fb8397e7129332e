//=========================================================================
// Loader Errors
//=========================================================================
//
// Error taxonomy shared by the loader, the blocker registry and the
// runtime bridge.
//
// Two severities:
// - Request errors: returned to the caller, state untouched
// - Sub-step errors: logged and recorded, the transition keeps going
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== LoaderError =========================================================

/// Errors produced while requesting or running a scene transition.
///
/// None of these are fatal. Request-level variants (`Busy`,
/// `EmptySceneName`, `NoScenesRequested`, `NullBlocker`,
/// `DuplicateBlocker`) are returned before any state changes. Sub-step
/// variants (`SceneNotFound`, `OperationUnavailable`, and `EmptySceneName`
/// for a single entry of a scene list) are recorded in
/// [`SceneLoader::transition_issues`](crate::core::scene::SceneLoader::transition_issues).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// A transition is already in flight.
    #[error("a scene transition is already in progress")]
    Busy,

    /// A scene name was empty.
    #[error("scene name is empty")]
    EmptySceneName,

    /// A multi-scene request carried no scenes.
    #[error("no scenes were requested")]
    NoScenesRequested,

    /// A blocker registration carried no blocker.
    #[error("scene loading blocker is missing")]
    NullBlocker,

    /// The same blocker reference was registered twice.
    #[error("scene loading blocker is already registered")]
    DuplicateBlocker,

    /// The host does not know the scene.
    #[error("scene `{0}` is not in the host's build list")]
    SceneNotFound(String),

    /// The host returned no operation handle.
    #[error("host returned no operation for scene `{scene}`")]
    OperationUnavailable { scene: String },

    /// The runtime thread is gone.
    #[error("loader runtime channel is disconnected")]
    ChannelDisconnected,
}

//=== ConfigError =========================================================

/// Errors produced while loading a [`LoaderConfig`](crate::core::config::LoaderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A value was out of range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

//=========================================================================
// Unit Tests
//=========================================================================
