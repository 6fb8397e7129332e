//=========================================================================
// Command Collector
//=========================================================================
//
// Logic-thread side of the command channel, with bounded draining and
// shutdown detection.
//
// Architecture:
//   Receiver<LoaderCommand> → collect_frame() → pending commands → TickControl
//
// Bounded draining keeps one tick from starving the transition it is
// supposed to advance.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::LoaderCommand;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== CommandCollector ====================================================

/// Collects pending loader commands once per tick.
pub(crate) struct CommandCollector {
    receiver: Receiver<LoaderCommand>,
    pending: Vec<LoaderCommand>,
}

impl CommandCollector {
    pub(crate) const MAX_COMMANDS_PER_FRAME: usize = 100;

    pub(crate) fn new(receiver: Receiver<LoaderCommand>) -> Self {
        Self {
            receiver,
            pending: Vec::with_capacity(4),
        }
    }

    /// Drains pending commands (bounded). Returns `Exit` on shutdown or
    /// when every sender is gone; commands drained before that are kept.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.pending.clear();
        let mut drained = 0;

        while drained < Self::MAX_COMMANDS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(LoaderCommand::Shutdown) => return TickControl::Exit,
                Ok(command) => {
                    self.pending.push(command);
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_COMMANDS_PER_FRAME {
            warn!("Command queue backlog: drained {} commands this frame", drained);
        }

        TickControl::Continue
    }

    /// Takes the commands collected this frame, leaving an empty buffer.
    pub(crate) fn take_commands(&mut self) -> Vec<LoaderCommand> {
        std::mem::take(&mut self.pending)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
