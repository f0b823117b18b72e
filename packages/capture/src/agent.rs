//! Host-facing control surface for the capture side.
//!
//! The host boundary delivers `{start}`, `{stop}` and `{delete: id}`
//! instructions; the agent routes them to the capture loop and the action
//! executor. Hub-initiated link events funnel through the same dispatch.

use tracing::info;

use crate::action::DeleteExecutor;
use crate::capture_loop::CaptureLoop;
use crate::link::LinkEvent;
use crate::protocol::ControlCommand;

/// Ties the capture loop and the delete executor to one command surface.
pub struct CaptureAgent {
    capture_loop: CaptureLoop,
    executor: DeleteExecutor,
}

impl CaptureAgent {
    pub fn new(capture_loop: CaptureLoop, executor: DeleteExecutor) -> Self {
        Self {
            capture_loop,
            executor,
        }
    }

    pub fn capture_loop(&self) -> &CaptureLoop {
        &self.capture_loop
    }

    /// Dispatch one boundary instruction.
    ///
    /// Start/stop are idempotent; a delete runs to completion or to its own
    /// retry exhaustion, with the outcome logged rather than returned.
    pub async fn handle_command(&self, command: ControlCommand) {
        match command {
            ControlCommand::Start => self.capture_loop.start(),
            ControlCommand::Stop => self.capture_loop.stop(),
            ControlCommand::Delete { id } => {
                let outcome = self.executor.execute(&id).await;
                info!(id = %id, outcome = ?outcome, "delete command finished");
            }
        }
    }

    /// Route a hub-initiated link event.
    pub async fn handle_link_event(&self, event: LinkEvent) {
        match event {
            LinkEvent::DeleteCommand { id } => {
                self.handle_command(ControlCommand::Delete { id }).await;
            }
            LinkEvent::Discovery { address } => {
                info!(address = %address, "relay hub reachable for review clients");
            }
        }
    }
}
