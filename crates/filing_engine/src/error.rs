use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::persist::PersistError;

/// Failure reported by a [`crate::Browser`] capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// The element was re-rendered between lookup and use.
    #[error("stale element reference")]
    StaleElement,
    #[error("no such element: {0}")]
    NoSuchElement(String),
    #[error("element not interactable: {0}")]
    NotInteractable(String),
    /// The remote session is gone; nothing further can be done with it.
    #[error("browser session lost: {0}")]
    SessionLost(String),
    #[error("browser command failed: {0}")]
    Command(String),
}

impl BrowserError {
    /// Timing races that a fresh lookup may resolve.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BrowserError::StaleElement
                | BrowserError::NoSuchElement(_)
                | BrowserError::NotInteractable(_)
        )
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, BrowserError::SessionLost(_))
    }
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to list download directory {dir:?}: {source}")]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to relocate {from:?}: {source}")]
    Relocate {
        from: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Errors that cross the search session boundary and abort the batch.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("browser session unusable: {0}")]
    SessionFatal(#[from] BrowserError),
    #[error("could not restore the filtered search page after {attempts} attempts")]
    RecoveryFailed { attempts: u32 },
    #[error("working directory unavailable: {0}")]
    Persist(#[from] PersistError),
}
