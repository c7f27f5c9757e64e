use super::{ControllerState, OrganizerController, ShutdownReason};
use crate::error::Result;
use tracing::{error, info};

impl OrganizerController {
    /// Release the tick timer, close any open frame log and stop keyboard input
    pub async fn shutdown(&mut self, reason: ShutdownReason) -> Result<i32> {
        info!("Beginning graceful shutdown");
        self.state = ControllerState::Stopping;

        let mut exit_code = reason.exit_code();

        if let Some(handler) = self.keyboard_handler.take() {
            if let Err(e) = handler.stop().await {
                error!("Error stopping keyboard input: {}", e);
                exit_code = 1;
            }
        }

        self.organizer.on_unload();

        self.state = ControllerState::Stopped;
        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }
}
