mod directory;
mod mock;
mod types;

pub use directory::DirectoryHost;
pub use mock::{HostCall, MockHost};
pub use types::{FrameRate, HostLogLevel, FALLBACK_FPS};

use crate::error::Result;
use crate::events::EventReceiver;
use std::path::PathBuf;

/// Capabilities the organizer needs from a recording application.
///
/// Adapters translate a concrete host (its frontend callbacks, timers and
/// output settings) into this interface; the organizer never talks to a host
/// any other way.
pub trait RecordingHost: Send + Sync {
    /// Path of the most recently finished recording, if the host knows one
    fn last_recording_path(&self) -> Option<PathBuf>;

    /// Save path configured on the active recording output.
    ///
    /// Either a directory or the full path of the file being written.
    fn recording_output_path(&self) -> Option<PathBuf>;

    /// Frame rate of the active video configuration
    fn video_frame_rate(&self) -> FrameRate;

    /// Register for lifecycle notifications and timer ticks
    fn lifecycle_events(&self) -> EventReceiver;

    /// Start delivering [`crate::events::RecordingEvent::Tick`] once per frame
    fn add_tick_timer(&self) -> Result<()>;

    /// Stop delivering ticks; a no-op when no timer is registered
    fn remove_tick_timer(&self);

    /// Write a line to the host's own log
    fn log(&self, level: HostLogLevel, message: &str);
}
