//=========================================================================
// Loader Orchestrator
//
// Drives a `SceneLoader` on a dedicated logic thread.
//
// Responsibilities:
// - Receive loader commands via the runtime bridge channel
// - Tick the loader at a fixed rate (TPS)
// - Publish transition events back to the caller
// - Hand the loader back when the thread stops
//
// Notes:
// The loader and its host are moved onto the logic thread and never
// shared. Callers interact only through message passing, so the
// single-threaded transition state needs no locking.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info};

//=== Module Declarations =================================================
pub mod blocker;
pub mod config;
pub mod error;
pub mod host;
pub mod runtime_bridge;
pub mod scene;
pub mod signals;

//=== Public API ==========================================================
pub use blocker::{BlockerRef, BlockerRegistry, SceneLoadingBlocker};
pub use config::LoaderConfig;
pub use error::{ConfigError, LoaderError};
pub use host::{AsyncOperation, LoadSceneMode, SceneHost};
pub use runtime_bridge::{LoaderCommand, TransitionEvent};
pub use scene::{SceneLoader, TransitionPhase, TransitionRequest};
pub use signals::{ListenerId, Signal, TransitionStatus};

//=== Internal Imports ====================================================
use runtime_bridge::{CommandCollector, TickControl};

//=== LoaderOrchestrator ==================================================
//
// Owns the loader until the logic thread is spawned, then moves it onto
// that thread for the rest of its run.
//
pub(crate) struct LoaderOrchestrator<H: SceneHost> {
    loader: SceneLoader<H>,
}

impl<H> LoaderOrchestrator<H>
where
    H: SceneHost + Send + 'static,
{
    //--- Construction -----------------------------------------------------
    pub fn new(loader: SceneLoader<H>) -> Self {
        Self { loader }
    }

    /// Mutable access to the loader before the thread starts.
    pub fn loader_mut(&mut self) -> &mut SceneLoader<H> {
        &mut self.loader
    }

    //--- spawn_logic_thread() --------------------------------------------
    //
    // Spawns the logic thread responsible for ticking the loader once per
    // fixed frame.
    //
    // Each tick:
    //  1. Collects pending commands
    //  2. Applies them to the loader
    //  3. Advances the transition by one fixed frame
    //  4. Sleeps to maintain fixed pacing
    //
    // Exits on `Shutdown` or when every command sender is dropped, and
    // returns the loader through the join handle.
    //
    pub fn spawn_logic_thread(
        self,
        receiver: Receiver<LoaderCommand>,
        events: Sender<TransitionEvent>,
        frame_duration: Duration,
    ) -> thread::JoinHandle<SceneLoader<H>> {
        thread::spawn(move || {
            let mut loader = self.loader;
            let forwarders = Self::attach_forwarders(&mut loader, &events);
            let mut collector = CommandCollector::new(receiver);

            loop {
                let frame_start = Instant::now();

                //--- Step 1: Gather commands -------------------------------
                let control = collector.collect_frame();

                //--- Step 2: Apply commands --------------------------------
                for command in collector.take_commands() {
                    Self::apply_command(&mut loader, command, &events);
                }

                if control == TickControl::Exit {
                    info!("Loader thread exiting (phase: {:?})", loader.phase());
                    break;
                }

                //--- Step 3: Advance transition ----------------------------
                loader.tick(frame_duration);

                //--- Step 4: Maintain deterministic pacing ----------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            for id in forwarders {
                loader.remove_listener(id);
            }
            loader
        })
    }

    //--- attach_forwarders() ---------------------------------------------
    //
    // Subscribes listeners that republish both completion signals on the
    // event channel. Returns their ids so they can be detached on exit.
    //
    fn attach_forwarders(
        loader: &mut SceneLoader<H>,
        events: &Sender<TransitionEvent>,
    ) -> [ListenerId; 2] {
        let changed = events.clone();
        let finished = events.clone();

        [
            loader.on_scene_changed(move |_| publish(&changed, TransitionEvent::SceneChanged)),
            loader.on_fade_finished(move |_| publish(&finished, TransitionEvent::FadeFinished)),
        ]
    }

    //--- apply_command() -------------------------------------------------
    fn apply_command(
        loader: &mut SceneLoader<H>,
        command: LoaderCommand,
        events: &Sender<TransitionEvent>,
    ) {
        match command {
            LoaderCommand::Load(request) => {
                let scenes = request.scenes().to_vec();
                match loader.request(request) {
                    Ok(()) => publish(events, TransitionEvent::Started { scenes }),
                    Err(err) => publish(events, TransitionEvent::Rejected(err)),
                }
            }
            LoaderCommand::AddBlocker(blocker) => {
                if let Err(err) = loader.add_scene_loading_blocker(blocker) {
                    publish(events, TransitionEvent::Rejected(err));
                }
            }
            LoaderCommand::Shutdown => {}
        }
    }
}

//--- publish() -----------------------------------------------------------
//
// The event channel is unbounded, so sending never blocks the logic
// thread and completion events are never lost while a receiver exists.
//
fn publish(events: &Sender<TransitionEvent>, event: TransitionEvent) {
    if let Err(err) = events.send(event) {
        debug!("No event receiver, dropping {:?}", err.into_inner());
    }
}
