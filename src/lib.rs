pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod keyboard_input;
pub mod layout;
pub mod organizer;
pub mod settings;
pub mod timestamp;

pub use app::{ControllerState, OrganizerController, ShutdownReason};
pub use config::RecorgConfig;
pub use error::{EventBusError, RecorgError, Result, SettingsError};
pub use events::{EventBus, EventFilter, EventReceiver, RecordingEvent};
pub use host::{DirectoryHost, FrameRate, HostLogLevel, MockHost, RecordingHost};
pub use organizer::{relocate_recording, LogSession, RecordingFileOrganizer, RelocationOutcome};
pub use settings::RecordingSettings;
pub use timestamp::TimestampPolicy;
