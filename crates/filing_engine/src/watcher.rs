use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};

use crate::persist::relocate_file;
use crate::poll::{poll_until, PollBudget};
use crate::WatchError;

/// Where a triggered download lands and where it must end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub source_directory: PathBuf,
    pub canonical_output_path: PathBuf,
    /// Extension without the leading dot, e.g. `pdf`.
    pub expected_extension: String,
}

/// Names of the complete files in a directory at one point in time.
///
/// Ordered, so "the first new entry" is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectorySnapshot {
    names: BTreeSet<String>,
}

impl DirectorySnapshot {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A new artifact arrived and now lives at the canonical path.
    Relocated(PathBuf),
    /// Budget exhausted. `saw_partial` tells a stalled transfer apart from a
    /// trigger that never started one.
    TimedOut { saw_partial: bool },
}

/// Detects finished downloads by diffing directory listings.
#[derive(Debug, Clone)]
pub struct DirectoryWatcher {
    budget: PollBudget,
    partial_extension: String,
}

struct Listing {
    complete: BTreeSet<String>,
    partial: bool,
}

impl DirectoryWatcher {
    pub fn new(budget: PollBudget, partial_extension: impl Into<String>) -> Self {
        Self {
            budget,
            partial_extension: partial_extension.into(),
        }
    }

    /// Complete files currently present; in-progress markers are excluded.
    pub fn snapshot(&self, directory: &Path) -> Result<DirectorySnapshot, WatchError> {
        let listing = self.list(directory)?;
        Ok(DirectorySnapshot {
            names: listing.complete,
        })
    }

    /// Polls `target.source_directory` until a file absent from `before`
    /// with the expected extension appears, then relocates it.
    ///
    /// While any partial-download marker is present the transfer is still
    /// running and the poll keeps waiting. Only the first new entry is taken
    /// when several arrive at once.
    pub fn await_completion(
        &self,
        before: &DirectorySnapshot,
        target: &DownloadTarget,
    ) -> Result<Completion, WatchError> {
        let dir = &target.source_directory;
        let mut saw_partial = false;

        let arrived = poll_until(self.budget, |attempt| {
            let listing = self.list(dir)?;
            if listing.partial {
                if !saw_partial {
                    engine_debug!("transfer in progress in {:?} (poll {})", dir, attempt + 1);
                }
                saw_partial = true;
                return Ok(None);
            }
            Ok(listing
                .complete
                .into_iter()
                .find(|name| {
                    !before.contains(name) && has_extension(name, &target.expected_extension)
                }))
        })?;

        let Some(name) = arrived else {
            return Ok(Completion::TimedOut { saw_partial });
        };

        let from = dir.join(&name);
        let saved = relocate_file(&from, &target.canonical_output_path)
            .map_err(|source| WatchError::Relocate { from, source })?;
        engine_info!("download {} saved as {:?}", name, saved);
        Ok(Completion::Relocated(saved))
    }

    fn list(&self, dir: &Path) -> Result<Listing, WatchError> {
        let list_err = |source| WatchError::List {
            dir: dir.to_path_buf(),
            source,
        };
        let mut listing = Listing {
            complete: BTreeSet::new(),
            partial: false,
        };
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if has_extension(&name, &self.partial_extension) {
                listing.partial = true;
            } else {
                listing.complete.insert(name);
            }
        }
        Ok(listing)
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
