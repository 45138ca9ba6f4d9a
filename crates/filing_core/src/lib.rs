//! Filing core: pure domain types and text helpers for the search session.
mod filename;
mod outcome;
mod query;
mod state;
mod summary;
mod year;

pub use filename::{canonical_file_name, sanitize_filename, DEFAULT_MAX_NAME_LEN};
pub use outcome::{NotFoundReason, SearchOutcome};
pub use query::{build_search_query, DEFAULT_MAX_QUERY_WORDS};
pub use state::UiState;
pub use summary::BatchSummary;
pub use year::year_matches;
