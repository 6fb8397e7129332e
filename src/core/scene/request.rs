//=========================================================================
// Transition Requests
//=========================================================================
//
// Describes what a transition should do before it starts, and plans it
// into an ordered list of load targets.
//
//   single("Town")                → [Town (mode)]          activate Town
//   multiple(["Town", "Forest"])  → [Town (Single),
//                                    Forest (Additive)]     activate explicit
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::error::LoaderError;
use crate::core::host::LoadSceneMode;

//=== TransitionRequest ===================================================

/// A scene transition request.
///
/// Built with [`TransitionRequest::single`] or
/// [`TransitionRequest::multiple`] and refined fluently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    scenes: Vec<String>,
    multi: bool,
    unload: Option<String>,
    mode: LoadSceneMode,
    set_active: bool,
    active_scene: Option<String>,
}

impl TransitionRequest {
    //--- Construction -----------------------------------------------------

    /// Loads one scene. Defaults: additive, set active afterwards.
    pub fn single(scene: impl Into<String>) -> Self {
        Self {
            scenes: vec![scene.into()],
            multi: false,
            unload: None,
            mode: LoadSceneMode::Additive,
            set_active: true,
            active_scene: None,
        }
    }

    /// Loads several scenes. The first replaces the loaded content, the
    /// rest load additively.
    pub fn multiple<I, S>(scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scenes: scenes.into_iter().map(Into::into).collect(),
            multi: true,
            unload: None,
            mode: LoadSceneMode::Single,
            set_active: true,
            active_scene: None,
        }
    }

    /// Unloads `scene` (if loaded) before loading.
    pub fn with_unload(mut self, scene: impl Into<String>) -> Self {
        self.unload = Some(scene.into());
        self
    }

    /// Load mode of a single-scene request. Ignored for multi-scene
    /// requests, whose modes are positional.
    pub fn with_mode(mut self, mode: LoadSceneMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_set_active(mut self, set_active: bool) -> Self {
        self.set_active = set_active;
        self
    }

    /// Scene to activate after a multi-scene load.
    pub fn with_active_scene(mut self, scene: impl Into<String>) -> Self {
        self.active_scene = Some(scene.into());
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    pub fn unload(&self) -> Option<&str> {
        self.unload.as_deref()
    }

    //--- Planning ---------------------------------------------------------

    /// Validates the request and resolves per-scene load modes.
    ///
    /// Only request-level problems fail here: an empty single scene name
    /// or an empty scene list. Empty names inside a scene list are left
    /// for the load worker to skip.
    pub(crate) fn plan(&self) -> Result<TransitionPlan, LoaderError> {
        if self.multi {
            if self.scenes.is_empty() {
                return Err(LoaderError::NoScenesRequested);
            }

            let targets = self
                .scenes
                .iter()
                .enumerate()
                .map(|(i, name)| LoadTarget {
                    name: name.clone(),
                    mode: if i == 0 { LoadSceneMode::Single } else { LoadSceneMode::Additive },
                })
                .collect();

            let activate = if self.set_active {
                self.active_scene.clone().filter(|s| !s.is_empty())
            } else {
                None
            };

            return Ok(TransitionPlan {
                targets,
                unload: self.unload.clone().filter(|s| !s.is_empty()),
                activate,
            });
        }

        let name = self.scenes.first().map(String::as_str).unwrap_or_default();
        if name.is_empty() {
            return Err(LoaderError::EmptySceneName);
        }

        Ok(TransitionPlan {
            targets: vec![LoadTarget { name: name.to_string(), mode: self.mode }],
            unload: self.unload.clone().filter(|s| !s.is_empty()),
            activate: self.set_active.then(|| name.to_string()),
        })
    }
}

//=== Planned Transition ==================================================

/// One scene to load and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTarget {
    pub name: String,
    pub mode: LoadSceneMode,
}

/// A validated request, ready for the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransitionPlan {
    pub targets: Vec<LoadTarget>,
    pub unload: Option<String>,
    pub activate: Option<String>,
}

//=========================================================================
// Unit Tests
//=========================================================================
