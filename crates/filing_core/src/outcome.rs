use std::fmt;
use std::path::PathBuf;

/// Verdict for one entity, produced once per search iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The document was downloaded and relocated to its canonical path.
    Found(PathBuf),
    /// Routine miss; the reason distinguishes "nothing matched" from
    /// "a download was triggered but nothing arrived".
    NotFound(NotFoundReason),
    /// An unexpected, non-fatal condition ended this entity early.
    Error(String),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn saved_path(&self) -> Option<&PathBuf> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No result row rendered within the wait budget.
    NoResults,
    /// Rows rendered but none carried the target year.
    NoMatchingYear,
    /// A matching row existed but its download control could not be activated.
    TriggerUnavailable,
    /// The trigger fired but no file materialized in the download directory.
    NoArtifact,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::NoResults => write!(f, "no results"),
            NotFoundReason::NoMatchingYear => write!(f, "no row for year"),
            NotFoundReason::TriggerUnavailable => write!(f, "download control not clickable"),
            NotFoundReason::NoArtifact => write!(f, "no file materialized"),
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Found(path) => write!(f, "found ({})", path.display()),
            SearchOutcome::NotFound(reason) => write!(f, "not found ({reason})"),
            SearchOutcome::Error(cause) => write!(f, "not found (error: {cause})"),
        }
    }
}
