use super::{FrameRate, HostLogLevel, RecordingHost};
use crate::config::HostConfig;
use crate::error::{RecorgError, Result};
use crate::events::{EventBus, EventFilter, EventReceiver, RecordingEvent};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Standalone host for recorders that drop finished files into a directory.
///
/// The most recently modified video file in the directory is treated as the
/// last recording. Lifecycle notifications come from whoever publishes on the
/// shared event bus (the keyboard handler in the `recorg` binary).
pub struct DirectoryHost {
    config: HostConfig,
    event_bus: Arc<EventBus>,
    tick_timer: Mutex<Option<CancellationToken>>,
}

impl DirectoryHost {
    pub fn new(config: HostConfig, event_bus: Arc<EventBus>) -> Self {
        Self {
            config,
            event_bus,
            tick_timer: Mutex::new(None),
        }
    }

    pub fn recording_dir(&self) -> &Path {
        Path::new(&self.config.recording_dir)
    }

    pub fn timer_active(&self) -> bool {
        self.tick_timer.lock().is_some()
    }

    fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .video_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    fn newest_video_file(&self) -> std::io::Result<Option<PathBuf>> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        for entry in fs::read_dir(self.recording_dir())? {
            let entry = entry?;
            let path = entry.path();
            let metadata = entry.metadata()?;

            if !metadata.is_file() || !self.is_video_file(&path) {
                continue;
            }

            let modified = metadata.modified()?;
            match &newest {
                Some((newest_time, _)) if *newest_time >= modified => {}
                _ => newest = Some((modified, path)),
            }
        }

        Ok(newest.map(|(_, path)| path))
    }
}

impl RecordingHost for DirectoryHost {
    fn last_recording_path(&self) -> Option<PathBuf> {
        match self.newest_video_file() {
            Ok(path) => {
                if path.is_none() {
                    debug!(
                        "No recordings found in {}",
                        self.recording_dir().display()
                    );
                }
                path
            }
            Err(e) => {
                warn!(
                    "Failed to scan recording directory {}: {}",
                    self.recording_dir().display(),
                    e
                );
                None
            }
        }
    }

    fn recording_output_path(&self) -> Option<PathBuf> {
        Some(self.recording_dir().to_path_buf())
    }

    fn video_frame_rate(&self) -> FrameRate {
        FrameRate::new(self.config.fps_numerator, self.config.fps_denominator)
    }

    fn lifecycle_events(&self) -> EventReceiver {
        EventReceiver::new(
            self.event_bus.subscribe(),
            EventFilter::All,
            "directory_host".to_string(),
        )
    }

    fn add_tick_timer(&self) -> Result<()> {
        let mut tick_timer = self.tick_timer.lock();
        if tick_timer.is_some() {
            debug!("Tick timer already registered");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|e| {
            RecorgError::component(
                "directory_host",
                format!("Tick timer needs an async runtime: {}", e),
            )
        })?;

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let event_bus = Arc::clone(&self.event_bus);
        let period = self.video_frame_rate().frame_interval();

        runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(e) = event_bus.publish(RecordingEvent::Tick).await {
                            debug!("Tick dropped: {}", e);
                        }
                    }
                }
            }
            debug!("Tick timer task exited");
        });

        debug!("Tick timer registered with period {:?}", period);
        *tick_timer = Some(token);
        Ok(())
    }

    fn remove_tick_timer(&self) {
        if let Some(token) = self.tick_timer.lock().take() {
            token.cancel();
            debug!("Tick timer removed");
        }
    }

    fn log(&self, level: HostLogLevel, message: &str) {
        match level {
            HostLogLevel::Debug => debug!(target: "recorg::host", "{}", message),
            HostLogLevel::Info => info!(target: "recorg::host", "{}", message),
            HostLogLevel::Warning => warn!(target: "recorg::host", "{}", message),
            HostLogLevel::Error => error!(target: "recorg::host", "{}", message),
        }
    }
}

impl Drop for DirectoryHost {
    fn drop(&mut self) {
        self.remove_tick_timer();
    }
}
