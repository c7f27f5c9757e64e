use super::types::{ControllerState, ShutdownReason};
use crate::config::RecorgConfig;
use crate::error::{RecorgError, Result};
use crate::events::{EventBus, RecordingEvent};
use crate::host::{HostLogLevel, RecordingHost};
use crate::keyboard_input::KeyboardInputHandler;
use crate::organizer::RecordingFileOrganizer;
use crate::timestamp::TimestampPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Owns the single organizer instance and feeds it host events
pub struct OrganizerController {
    pub(super) config: RecorgConfig,
    pub(super) config_path: Option<PathBuf>,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) host: Arc<dyn RecordingHost>,
    pub(super) organizer: RecordingFileOrganizer,
    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    pub(super) keyboard_enabled: bool,
    pub(super) state: ControllerState,
}

impl OrganizerController {
    /// Create a controller; fails if the configured recording settings are out of bounds
    pub fn new(
        config: RecorgConfig,
        host: Arc<dyn RecordingHost>,
        event_bus: Arc<EventBus>,
    ) -> Result<Self> {
        let organizer = RecordingFileOrganizer::new(
            Arc::clone(&host),
            config.recording,
            TimestampPolicy::from_config(&config.timestamp),
        )?;

        Ok(Self {
            config,
            config_path: None,
            event_bus,
            host,
            organizer,
            keyboard_handler: None,
            keyboard_enabled: false,
            state: ControllerState::Stopped,
        })
    }

    /// Configuration file re-read on [`RecordingEvent::ReloadSettings`]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable the keyboard input handler
    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard_enabled = enabled;
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> &RecorgConfig {
        &self.config
    }

    pub fn organizer(&self) -> &RecordingFileOrganizer {
        &self.organizer
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Handle one event. Returns a shutdown reason when the loop should end.
    ///
    /// Handler failures are reported to the host and do not stop the loop.
    pub fn process_event(&mut self, event: &RecordingEvent) -> Option<ShutdownReason> {
        match event {
            RecordingEvent::ShutdownRequested { reason, .. } => {
                Some(ShutdownReason::UserRequest(reason.clone()))
            }
            RecordingEvent::ReloadSettings => {
                if let Err(e) = self.reload_settings() {
                    error!("Failed to reload settings: {}", e);
                    self.host
                        .log(HostLogLevel::Error, &format!("Settings not reloaded: {}", e));
                }
                None
            }
            event => {
                if let Err(e) = self.organizer.handle_event(event) {
                    error!("Failed to handle '{}': {}", event.description(), e);
                    self.host.log(
                        HostLogLevel::Error,
                        &format!("{} failed: {}", event.description(), e),
                    );
                }
                None
            }
        }
    }

    /// Re-read the configuration file and apply its recording settings
    pub fn reload_settings(&mut self) -> Result<()> {
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| RecorgError::system("No configuration file to reload settings from"))?;

        let reloaded = RecorgConfig::load_from_file(path)?;
        self.organizer.update_settings(reloaded.recording)?;
        self.config.recording = reloaded.recording;

        info!("Settings reloaded from {}", path.display());
        Ok(())
    }
}
