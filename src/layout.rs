//! Folder and filename layout for organized recordings.
//!
//! ```text
//! <base>/W<week>/D<day>/vid/C<camera>_W<week>D<day>_REC<count>-<total>_<stamp><ext>
//! <base>/W<week>/D<day>/vid/video_log/L<camera>_W<week>D<day>_REC<count>-<total>_<stamp>.csv
//! ```

use crate::settings::RecordingSettings;
use std::path::{Path, PathBuf};

pub const VIDEO_DIR_NAME: &str = "vid";
pub const LOG_DIR_NAME: &str = "video_log";
pub const LOG_EXTENSION: &str = "csv";

/// Extensions that mark a host output path as a file rather than a directory
const CONTAINER_EXTENSIONS: &[&str] = &["mp4", "mkv"];

/// `<base>/W<week>/D<day>/vid`
pub fn video_dir(base: &Path, settings: &RecordingSettings) -> PathBuf {
    base.join(settings.week_dir_name())
        .join(settings.day_dir_name())
        .join(VIDEO_DIR_NAME)
}

/// `<base>/W<week>/D<day>/vid/video_log`
pub fn log_dir(base: &Path, settings: &RecordingSettings) -> PathBuf {
    video_dir(base, settings).join(LOG_DIR_NAME)
}

/// Video filename; `extension` is appended verbatim after a dot when present
pub fn video_file_name(
    settings: &RecordingSettings,
    stamp: &str,
    extension: Option<&str>,
) -> String {
    let stem = format!("C{}_{}_{}", settings.camera_id, settings.session_tag(), stamp);
    match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext),
        _ => stem,
    }
}

pub fn log_file_name(settings: &RecordingSettings, stamp: &str) -> String {
    format!(
        "L{}_{}_{}.{}",
        settings.camera_id,
        settings.session_tag(),
        stamp,
        LOG_EXTENSION
    )
}

/// Destination of a finished recording, next to the source under the dated folders
pub fn recording_destination(source: &Path, settings: &RecordingSettings, stamp: &str) -> PathBuf {
    let base = source.parent().unwrap_or_else(|| Path::new(""));
    let extension = source.extension().and_then(|ext| ext.to_str());
    video_dir(base, settings).join(video_file_name(settings, stamp, extension))
}

/// Base directory for a host output path.
///
/// Hosts report either the output directory or the full path of the file being
/// written; a path with a container extension resolves to its parent.
pub fn output_base_dir(output_path: &Path) -> PathBuf {
    let is_container = output_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            CONTAINER_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false);

    if is_container {
        output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    } else {
        output_path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_settings() -> RecordingSettings {
        RecordingSettings::new(10, 4, 2, 1, 3)
    }

    #[test]
    fn test_recording_destination_layout() {
        let destination = recording_destination(
            Path::new("/rec/raw.mp4"),
            &sample_settings(),
            "2025-07-10T14_03_22_123-0700",
        );
        assert_eq!(
            destination,
            PathBuf::from("/rec/W1/D3/vid/C2_W1D3_REC4-10_2025-07-10T14_03_22_123-0700.mp4")
        );
    }

    #[test]
    fn test_destination_keeps_source_extension() {
        let settings = RecordingSettings::default();
        let mkv = recording_destination(Path::new("/data/out.MKV"), &settings, "S");
        assert_eq!(mkv, PathBuf::from("/data/W0/D1/vid/C1_W0D1_REC1-1_S.MKV"));

        let bare = recording_destination(Path::new("/data/capture"), &settings, "S");
        assert_eq!(bare, PathBuf::from("/data/W0/D1/vid/C1_W0D1_REC1-1_S"));
    }

    #[test]
    fn test_log_layout() {
        let settings = sample_settings();
        assert_eq!(
            log_dir(Path::new("/rec"), &settings),
            PathBuf::from("/rec/W1/D3/vid/video_log")
        );
        assert_eq!(log_file_name(&settings, "S"), "L2_W1D3_REC4-10_S.csv");
    }

    #[test]
    fn test_output_base_dir() {
        assert_eq!(
            output_base_dir(Path::new("/rec/2025-07-10 14-03-22.mkv")),
            PathBuf::from("/rec")
        );
        assert_eq!(
            output_base_dir(Path::new("/rec/session.MP4")),
            PathBuf::from("/rec")
        );
        assert_eq!(output_base_dir(Path::new("/rec")), PathBuf::from("/rec"));
        assert_eq!(
            output_base_dir(Path::new("/rec/notes.txt")),
            PathBuf::from("/rec/notes.txt")
        );
    }
}
