mod core;
mod frame_log;
mod relocate;

pub use core::RecordingFileOrganizer;
pub use frame_log::{LogSession, LogSummary, CSV_HEADER};
pub use relocate::{relocate_recording, RelocationOutcome};
