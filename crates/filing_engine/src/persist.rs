use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure a directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Move `source` to `destination`, replacing whatever is already there.
///
/// A plain rename is used when possible. When the two paths live on
/// different filesystems the content is copied into a temp file next to the
/// destination and persisted over it, so readers never see a partial file.
pub fn relocate_file(source: &Path, destination: &Path) -> Result<PathBuf, PersistError> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_output_dir(parent)?;

    // Last download for a canonical name wins.
    if destination.exists() {
        fs::remove_file(destination)?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(destination.to_path_buf()),
        Err(err) => {
            engine_debug!(
                "rename {:?} -> {:?} failed ({}); copying instead",
                source,
                destination,
                err
            );
            copy_then_remove(source, destination, parent)
        }
    }
}

fn copy_then_remove(source: &Path, destination: &Path, parent: &Path) -> Result<PathBuf, PersistError> {
    let mut tmp = NamedTempFile::new_in(parent)?;
    let mut input = File::open(source)?;
    io::copy(&mut input, tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(destination)
        .map_err(|e| PersistError::Io(e.error))?;
    fs::remove_file(source)?;
    Ok(destination.to_path_buf())
}
