use super::frame_log::{LogSession, LogSummary};
use super::relocate::{relocate_recording, RelocationOutcome};
use crate::error::Result;
use crate::events::RecordingEvent;
use crate::host::{HostLogLevel, RecordingHost};
use crate::layout;
use crate::settings::RecordingSettings;
use crate::timestamp::TimestampPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Renames finished recordings into the dated folder layout and keeps a
/// frame-locked timestamp log while a recording is running
pub struct RecordingFileOrganizer {
    host: Arc<dyn RecordingHost>,
    settings: RecordingSettings,
    timestamps: TimestampPolicy,
    session: Option<LogSession>,
}

impl RecordingFileOrganizer {
    /// Create an organizer; `settings` must be within bounds
    pub fn new(
        host: Arc<dyn RecordingHost>,
        settings: RecordingSettings,
        timestamps: TimestampPolicy,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            host,
            settings,
            timestamps,
            session: None,
        })
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    /// Replace the operator settings. Invalid settings keep the current ones.
    pub fn update_settings(&mut self, settings: RecordingSettings) -> Result<()> {
        settings.validate()?;
        if settings != self.settings {
            info!(
                "Recording settings updated: camera {} {}",
                settings.camera_id,
                settings.session_tag()
            );
        }
        self.settings = settings;
        Ok(())
    }

    pub fn is_logging(&self) -> bool {
        self.session.is_some()
    }

    /// Next frame index of the active log session
    pub fn frame_index(&self) -> Option<u64> {
        self.session.as_ref().map(LogSession::frame_index)
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.session.as_ref().map(LogSession::path)
    }

    /// Dispatch a host event to its handler
    pub fn handle_event(&mut self, event: &RecordingEvent) -> Result<()> {
        match event {
            RecordingEvent::RecordingStarted { .. } => {
                self.on_recording_started()?;
            }
            RecordingEvent::RecordingStopped { .. } => {
                self.on_recording_stopped()?;
            }
            RecordingEvent::Tick => self.on_tick()?,
            RecordingEvent::ReloadSettings | RecordingEvent::ShutdownRequested { .. } => {}
        }
        Ok(())
    }

    /// Open the frame log for a new recording and start the tick timer.
    ///
    /// Returns the log path, or `None` when the host has no output path.
    pub fn on_recording_started(&mut self) -> Result<Option<PathBuf>> {
        if self.session.is_some() {
            warn!("Recording started while a frame log is still open; closing it");
            self.host.remove_tick_timer();
            self.finish_log_session();
        }

        let output_path = match self.host.recording_output_path() {
            Some(path) => path,
            None => {
                debug!("Host reported no recording output path; frame log skipped");
                return Ok(None);
            }
        };

        let base = layout::output_base_dir(&output_path);
        let log_path = layout::log_dir(&base, &self.settings)
            .join(layout::log_file_name(&self.settings, &self.timestamps.stamp()));

        let session = LogSession::create(&log_path)?;
        info!(
            "Frame log {} opened at {}",
            session.session_id(),
            log_path.display()
        );
        self.session = Some(session);

        if let Err(e) = self.host.add_tick_timer() {
            self.finish_log_session();
            return Err(e);
        }

        Ok(Some(log_path))
    }

    /// Close the frame log and move the finished recording into place
    pub fn on_recording_stopped(&mut self) -> Result<Option<RelocationOutcome>> {
        if self.session.is_some() {
            self.host.remove_tick_timer();
            self.finish_log_session();
        }

        let source = match self.host.last_recording_path() {
            Some(path) => path,
            None => {
                debug!("Host reported no finished recording; nothing to organize");
                return Ok(None);
            }
        };

        let outcome = relocate_recording(&source, &self.settings, &self.timestamps.stamp())?;
        match &outcome {
            RelocationOutcome::Moved { from, to } => {
                info!("Recording {} moved to {}", from.display(), to.display());
                self.host.log(
                    HostLogLevel::Info,
                    &format!("Recording saved as {}", to.display()),
                );
            }
            RelocationOutcome::Collision { destination, .. } => {
                let message = format!(
                    "Collision: {} already exists; file not moved.",
                    destination.display()
                );
                warn!("{}", message);
                self.host.log(HostLogLevel::Warning, &message);
            }
        }

        Ok(Some(outcome))
    }

    /// Append one row to the active frame log
    pub fn on_tick(&mut self) -> Result<()> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return Ok(()),
        };

        let frame_rate = self.host.video_frame_rate();
        session.write_frame(frame_rate)?;
        Ok(())
    }

    /// Release the tick timer and close any open log, whatever the recording state
    pub fn on_unload(&mut self) {
        self.host.remove_tick_timer();
        self.finish_log_session();
    }

    fn finish_log_session(&mut self) -> Option<LogSummary> {
        let session = self.session.take()?;
        match session.close() {
            Ok(summary) => {
                info!(
                    "Frame log {} closed: {} frames over {:.1}s since {}",
                    summary.session_id,
                    summary.frames_written,
                    summary.duration.as_secs_f64(),
                    summary.started.to_rfc3339()
                );
                Some(summary)
            }
            Err(e) => {
                error!("Failed to close frame log: {}", e);
                self.host
                    .log(HostLogLevel::Error, &format!("Failed to close frame log: {}", e));
                None
            }
        }
    }
}
