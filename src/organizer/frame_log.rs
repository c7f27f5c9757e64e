use crate::error::{RecorgError, Result};
use crate::host::FrameRate;
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

pub const CSV_HEADER: &str = "frame,timestamp_ms";

/// Summary of a finished log session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub session_id: Uuid,
    pub path: PathBuf,
    pub frames_written: u64,
    pub started: DateTime<Utc>,
    pub duration: Duration,
}

/// Per-recording frame log: one CSV row per host tick
pub struct LogSession {
    session_id: Uuid,
    path: PathBuf,
    writer: BufWriter<File>,
    frame_index: u64,
    started_at: Instant,
    started_wall: DateTime<Utc>,
}

impl LogSession {
    /// Create the log file at `path` (directories included) and write the header
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                RecorgError::component(
                    "frame_log",
                    format!("Failed to create log directory {}: {}", dir.display(), e),
                )
            })?;
        }

        let file = File::create(path).map_err(|e| {
            RecorgError::component(
                "frame_log",
                format!("Failed to create log file {}: {}", path.display(), e),
            )
        })?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", CSV_HEADER)?;

        let session_id = Uuid::new_v4();
        debug!("Opened frame log {} ({})", path.display(), session_id);

        Ok(Self {
            session_id,
            path: path.to_path_buf(),
            writer,
            frame_index: 0,
            started_at: Instant::now(),
            started_wall: Utc::now(),
        })
    }

    /// Append the row for the current frame and advance the counter.
    ///
    /// Returns the elapsed milliseconds written.
    pub fn write_frame(&mut self, frame_rate: FrameRate) -> Result<u64> {
        let elapsed_ms = frame_rate.frame_elapsed_ms(self.frame_index);
        writeln!(self.writer, "{},{}", self.frame_index, elapsed_ms)?;
        self.frame_index += 1;
        Ok(elapsed_ms)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index of the next frame to be written
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Flush and close the file
    pub fn close(self) -> Result<LogSummary> {
        let LogSession {
            session_id,
            path,
            writer,
            frame_index,
            started_at,
            started_wall,
        } = self;

        let file = writer.into_inner().map_err(|e| {
            RecorgError::component(
                "frame_log",
                format!("Failed to flush log file {}: {}", path.display(), e.error()),
            )
        })?;
        file.sync_all()?;

        Ok(LogSummary {
            session_id,
            path,
            frames_written: frame_index,
            started: started_wall,
            duration: started_at.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.csv");

        let opened = Utc::now();
        let mut session = LogSession::create(&path).unwrap();
        assert_eq!(session.frame_index(), 0);

        let rate = FrameRate::new(30, 1);
        assert_eq!(session.write_frame(rate).unwrap(), 0);
        assert_eq!(session.write_frame(rate).unwrap(), 33);
        assert_eq!(session.write_frame(rate).unwrap(), 66);
        assert_eq!(session.frame_index(), 3);

        let summary = session.close().unwrap();
        assert_eq!(summary.frames_written, 3);
        assert_eq!(summary.path, path);
        assert!(summary.started >= opened);
        assert!(summary.started <= Utc::now());

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "frame,timestamp_ms\n0,0\n1,33\n2,66\n");
    }

    #[test]
    fn test_empty_session_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        let session = LogSession::create(&path).unwrap();
        let summary = session.close().unwrap();
        assert_eq!(summary.frames_written, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "frame,timestamp_ms\n");
    }

    #[test]
    fn test_create_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let result = LogSession::create(&blocker.join("log.csv"));
        assert!(matches!(result, Err(RecorgError::Component { .. })));
    }
}
