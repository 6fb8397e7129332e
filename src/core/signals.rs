//=========================================================================
// Transition Signals
//=========================================================================
//
// Listener registry for the two completion signals of a transition.
//
// Firing order per transition:
//   SceneChanged  (is_loading = false, is_fading = true)
//        ↓  fade out
//   FadeFinished  (is_loading = false, is_fading = false)
//
// Listeners fire in registration order. Removal is idempotent.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Signal Types ========================================================

/// The two signals a transition emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// New scenes are ready; blockers have cleared.
    SceneChanged,

    /// The loading screen has finished fading out.
    FadeFinished,
}

/// Loader flags captured at the moment a signal fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionStatus {
    pub is_loading: bool,
    pub is_fading: bool,
}

/// Handle returned on registration, used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TransitionStatus) + Send>;

//=== TransitionSignals ===================================================

/// Ordered listener lists for [`Signal::SceneChanged`] and
/// [`Signal::FadeFinished`].
#[derive(Default)]
pub struct TransitionSignals {
    next_id: u64,
    scene_changed: Vec<(ListenerId, Listener)>,
    fade_finished: Vec<(ListenerId, Listener)>,
}

impl TransitionSignals {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers `listener` for `signal`.
    pub fn subscribe<F>(&mut self, signal: Signal, listener: F) -> ListenerId
    where
        F: FnMut(&TransitionStatus) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.listeners_mut(signal).push((id, Box::new(listener)));
        debug!("Registered {:?} listener {:?}", signal, id);
        id
    }

    /// Removes a listener. Returns `false` if it was not registered
    /// (including when it was already removed).
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for signal in [Signal::SceneChanged, Signal::FadeFinished] {
            let listeners = self.listeners_mut(signal);
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                debug!("Removed {:?} listener {:?}", signal, id);
                return true;
            }
        }
        false
    }

    //--- Emission ---------------------------------------------------------

    /// Invokes every listener of `signal` in registration order.
    pub(crate) fn emit(&mut self, signal: Signal, status: &TransitionStatus) {
        for (_, listener) in self.listeners_mut(signal).iter_mut() {
            listener(status);
        }
    }

    fn listeners_mut(&mut self, signal: Signal) -> &mut Vec<(ListenerId, Listener)> {
        match signal {
            Signal::SceneChanged => &mut self.scene_changed,
            Signal::FadeFinished => &mut self.fade_finished,
        }
    }
}

impl std::fmt::Debug for TransitionSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionSignals")
            .field("scene_changed", &self.scene_changed.len())
            .field("fade_finished", &self.fade_finished.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
