//=========================================================================
// Loader Runtime
//
// Runs a `SceneLoader` on its own logic thread.
//
// Architecture:
// ```text
//     RuntimeBuilder  ──build()──>  Runtime  ──spawn()──>  RuntimeHandle
//         │                           │                      │
//         ├─ with_tps()               └─ init()              ├─ request()
//         └─ with_channel_capacity()                         ├─ add_blocker()
//                                                            ├─ events()
//                                                            └─ shutdown()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::blocker::BlockerRef;
use crate::core::error::LoaderError;
use crate::core::host::SceneHost;
use crate::core::runtime_bridge::{LoaderCommand, TransitionEvent};
use crate::core::scene::{SceneLoader, TransitionRequest};
use crate::core::LoaderOrchestrator;

//=== RuntimeBuilder ======================================================

/// Builder for a [`Runtime`].
///
/// The tick rate fixes the frame length the loader is advanced by, so
/// fade and loading times are measured in logic-thread frames rather
/// than wall-clock time. A thread that falls behind slows the transition
/// down instead of skipping phases.
///
/// # Default Values
///
/// - **Tick rate**: 60 per second
/// - **Command queue**: 128 pending commands
///
/// # Examples
///
/// ```no_run
/// use aetheric_scene_loader::prelude::*;
///
/// let host = InMemorySceneHost::new(["Menu", "Town"]);
/// let loader = SceneLoader::new(host, LoaderConfig::default());
///
/// let handle = RuntimeBuilder::new()
///     .with_tps(120.0)
///     .build(loader)
///     .spawn();
///
/// handle.request(TransitionRequest::single("Town")).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeBuilder {
    ticks_per_second: f64,
    command_capacity: usize,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            ticks_per_second: 60.0,
            command_capacity: 128,
        }
    }

    /// Sets how many times per second the loader is ticked.
    ///
    /// # Panics
    ///
    /// Panics unless `tps` is positive and finite.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(
            tps.is_finite() && tps > 0.0,
            "Loader tick rate must be positive, got {}",
            tps
        );
        self.ticks_per_second = tps;
        self
    }

    /// Sets how many commands may wait for the logic thread before
    /// [`RuntimeHandle::request`] blocks. Events are never bounded.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Command queue needs room for at least one command");
        self.command_capacity = capacity;
        self
    }

    /// Fixed `dt` handed to [`SceneLoader::tick`] every frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.ticks_per_second)
    }

    /// Wraps `loader` in a runtime that is ready to spawn.
    pub fn build<H>(self, loader: SceneLoader<H>) -> Runtime<H>
    where
        H: SceneHost + Send + 'static,
    {
        let frame = self.frame_duration();
        info!(
            "Building loader runtime (frame: {:?}, command queue: {})",
            frame, self.command_capacity
        );

        Runtime {
            orchestrator: LoaderOrchestrator::new(loader),
            frame,
            command_capacity: self.command_capacity,
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Runtime =============================================================

/// A configured loader that has not started ticking yet.
///
/// Create via [`RuntimeBuilder`].
pub struct Runtime<H: SceneHost> {
    orchestrator: LoaderOrchestrator<H>,
    frame: Duration,
    command_capacity: usize,
}

impl<H> Runtime<H>
where
    H: SceneHost + Send + 'static,
{
    //--- Initialization ---------------------------------------------------

    /// Configures the loader before the logic thread takes it over:
    /// listeners, blockers or a different timing config.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut SceneLoader<H>),
    {
        info!("Initializing scene loader");
        init_fn(self.orchestrator.loader_mut());
        self
    }

    //--- Execution --------------------------------------------------------

    /// Moves the loader onto a logic thread and returns the handle that
    /// talks to it.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates a bounded command channel and an unbounded event channel
    /// 2. Spawns the logic thread, ticking once per frame
    /// 3. The thread runs until [`RuntimeHandle::shutdown`] or until the
    ///    handle is dropped
    pub fn spawn(self) -> RuntimeHandle<H> {
        info!("Starting loader runtime (frame: {:?})", self.frame);

        //--- 1. Create communication channels ----------------------------
        let (command_tx, command_rx): (Sender<LoaderCommand>, Receiver<LoaderCommand>) =
            bounded(self.command_capacity);
        let (event_tx, event_rx) = unbounded();

        //--- 2. Spawn the logic thread -----------------------------------
        let thread = self
            .orchestrator
            .spawn_logic_thread(command_rx, event_tx, self.frame);
        info!("Loader logic thread spawned");

        RuntimeHandle {
            commands: command_tx,
            events: event_rx,
            thread,
        }
    }
}

//=== RuntimeHandle =======================================================

/// Caller-side handle to a running loader.
pub struct RuntimeHandle<H: SceneHost> {
    commands: Sender<LoaderCommand>,
    events: Receiver<TransitionEvent>,
    thread: thread::JoinHandle<SceneLoader<H>>,
}

impl<H: SceneHost> RuntimeHandle<H> {
    /// Queues a transition request.
    ///
    /// Acceptance is reported asynchronously as `Started` or `Rejected` on
    /// the event channel.
    pub fn request(&self, request: TransitionRequest) -> Result<(), LoaderError> {
        self.send(LoaderCommand::Load(request))
    }

    /// Queues a blocker registration. Duplicates are reported as
    /// `Rejected` events.
    pub fn add_blocker(&self, blocker: BlockerRef) -> Result<(), LoaderError> {
        self.send(LoaderCommand::AddBlocker(blocker))
    }

    /// Transition events, in the order the logic thread produced them.
    pub fn events(&self) -> &Receiver<TransitionEvent> {
        &self.events
    }

    /// Stops the logic thread and returns the loader.
    ///
    /// Commands queued before the shutdown are still applied. A transition
    /// in flight is left where it stopped.
    pub fn shutdown(self) -> thread::Result<SceneLoader<H>> {
        // The thread also exits on disconnect, so a failed send is fine.
        let _ = self.commands.send(LoaderCommand::Shutdown);

        let result = self.thread.join();
        match &result {
            Ok(_) => info!("Loader thread terminated cleanly"),
            Err(e) => error!("Loader thread panicked: {:?}", e),
        }
        result
    }

    fn send(&self, command: LoaderCommand) -> Result<(), LoaderError> {
        self.commands.send(command).map_err(|err| {
            error!("Loader thread is gone, dropping {:?}", err.into_inner());
            LoaderError::ChannelDisconnected
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LoaderConfig;
    use crate::core::host::InMemorySceneHost;

    const WAIT: Duration = Duration::from_secs(5);

    fn quick_loader() -> SceneLoader<InMemorySceneHost> {
        let host = InMemorySceneHost::new(["Menu", "Town"])
            .with_loaded_scene("Menu")
            .with_operation_frames(1);
        let config = LoaderConfig::new()
            .with_fade_time(0.02)
            .with_loading_time(0.02)
            .with_post_load_delay(0.0);
        SceneLoader::new(host, config)
    }

    //=====================================================================
    // RuntimeBuilder Tests
    //=====================================================================

    #[test]
    fn tick_rate_sets_the_frame_handed_to_the_loader() {
        assert_eq!(
            RuntimeBuilder::default().frame_duration(),
            Duration::from_secs_f64(1.0 / 60.0)
        );
        assert_eq!(
            RuntimeBuilder::new().with_tps(50.0).frame_duration(),
            Duration::from_millis(20)
        );

        let runtime = RuntimeBuilder::new()
            .with_tps(50.0)
            .with_channel_capacity(4)
            .build(quick_loader());
        assert_eq!(runtime.frame, Duration::from_millis(20));
        assert_eq!(runtime.command_capacity, 4);
    }

    #[test]
    #[should_panic(expected = "Loader tick rate must be positive")]
    fn zero_tick_rate_is_rejected() {
        RuntimeBuilder::new().with_tps(0.0);
    }

    //=====================================================================
    // Runtime Tests
    //=====================================================================

    #[test]
    fn init_runs_before_spawn() {
        let runtime = RuntimeBuilder::new()
            .build(quick_loader())
            .init(|loader| loader.set_config(LoaderConfig::new().with_fade_time(0.5)));

        let loader = runtime.spawn().shutdown().unwrap();
        assert_eq!(loader.config().fade_time, 0.5);
        assert!(!loader.is_busy());
    }

    #[test]
    fn runtime_runs_a_transition() {
        let handle = RuntimeBuilder::new()
            .with_tps(500.0)
            .build(quick_loader())
            .spawn();

        handle.request(TransitionRequest::single("Town")).unwrap();

        assert_eq!(
            handle.events().recv_timeout(WAIT).unwrap(),
            TransitionEvent::Started {
                scenes: vec!["Town".to_string()]
            }
        );
        assert_eq!(
            handle.events().recv_timeout(WAIT).unwrap(),
            TransitionEvent::SceneChanged
        );
        assert_eq!(
            handle.events().recv_timeout(WAIT).unwrap(),
            TransitionEvent::FadeFinished
        );

        let loader = handle.shutdown().unwrap();
        assert!(!loader.is_busy());
        assert!(loader.host().loaded_scenes().contains(&"Town".to_string()));
    }

    #[test]
    fn runtime_reports_rejected_requests() {
        let handle = RuntimeBuilder::new()
            .with_tps(500.0)
            .build(quick_loader())
            .spawn();

        handle.request(TransitionRequest::single("")).unwrap();

        assert_eq!(
            handle.events().recv_timeout(WAIT).unwrap(),
            TransitionEvent::Rejected(LoaderError::EmptySceneName)
        );

        handle.shutdown().unwrap();
    }

    #[test]
    fn shutdown_returns_loader() {
        let handle = RuntimeBuilder::new().build(quick_loader()).spawn();

        let loader = handle.shutdown().unwrap();
        assert_eq!(loader.current_scene().as_deref(), Some("Menu"));
    }

    #[test]
    fn completion_events_survive_a_small_command_queue() {
        let handle = RuntimeBuilder::new()
            .with_tps(500.0)
            .with_channel_capacity(1)
            .build(quick_loader())
            .spawn();

        handle.request(TransitionRequest::single("Town")).unwrap();
        handle.request(TransitionRequest::single("Menu")).unwrap();

        // Nothing is received until the logic thread has stopped
        let events = handle.events().clone();
        for _ in 0..500 {
            if events.len() >= 4 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let loader = handle.shutdown().unwrap();
        assert!(!loader.is_busy());

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                TransitionEvent::Started {
                    scenes: vec!["Town".to_string()]
                },
                TransitionEvent::Rejected(LoaderError::Busy),
                TransitionEvent::SceneChanged,
                TransitionEvent::FadeFinished,
            ]
        );
    }
}
