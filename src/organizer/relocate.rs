use crate::error::{RecorgError, Result};
use crate::layout;
use crate::settings::RecordingSettings;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of relocating a finished recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    Moved { from: PathBuf, to: PathBuf },
    /// Destination already taken; the source was left untouched
    Collision {
        source: PathBuf,
        destination: PathBuf,
    },
}

impl RelocationOutcome {
    pub fn destination(&self) -> &Path {
        match self {
            RelocationOutcome::Moved { to, .. } => to,
            RelocationOutcome::Collision { destination, .. } => destination,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, RelocationOutcome::Moved { .. })
    }
}

/// Move `source` into the dated folder layout next to it.
///
/// Never overwrites: an existing destination yields [`RelocationOutcome::Collision`].
pub fn relocate_recording(
    source: &Path,
    settings: &RecordingSettings,
    stamp: &str,
) -> Result<RelocationOutcome> {
    let destination = layout::recording_destination(source, settings, stamp);

    if let Some(dir) = destination.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            RecorgError::component(
                "relocate",
                format!("Failed to create directory {}: {}", dir.display(), e),
            )
        })?;
    }

    if destination.exists() {
        return Ok(RelocationOutcome::Collision {
            source: source.to_path_buf(),
            destination,
        });
    }

    // Another writer may claim the name between the check above and the move
    match move_file(source, &destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(RelocationOutcome::Collision {
                source: source.to_path_buf(),
                destination,
            });
        }
        Err(e) => return Err(e.into()),
    }
    debug!("Moved {} -> {}", source.display(), destination.display());

    Ok(RelocationOutcome::Moved {
        from: source.to_path_buf(),
        to: destination,
    })
}

/// Link then unlink, so an existing destination is never replaced. Falls
/// back to an exclusive copy and remove when linking is refused (e.g. across
/// filesystems). An occupied destination reports `AlreadyExists`.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    let link_error = match fs::hard_link(from, to) {
        Ok(()) => return fs::remove_file(from),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
        Err(e) => e,
    };

    if !from.is_file() {
        return Err(link_error);
    }

    warn!(
        "Link of {} failed ({}), copying instead",
        from.display(),
        link_error
    );

    match copy_exclusive(from, to) {
        Ok(_) => fs::remove_file(from),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        Err(_) => Err(link_error),
    }
}

/// Copy into a file that must not exist yet; a failed copy leaves nothing behind
fn copy_exclusive(from: &Path, to: &Path) -> io::Result<u64> {
    let mut reader = File::open(from)?;
    let mut writer = OpenOptions::new().write(true).create_new(true).open(to)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|n| {
        writer.sync_all()?;
        Ok(n)
    });
    if copied.is_err() {
        drop(writer);
        let _ = fs::remove_file(to);
    }
    copied
}
