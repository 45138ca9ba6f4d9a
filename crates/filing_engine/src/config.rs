use std::path::PathBuf;
use std::time::Duration;

use filing_core::DEFAULT_MAX_QUERY_WORDS;

use crate::poll::PollBudget;

pub const DEFAULT_SEARCH_URL: &str = "https://www.efast.dol.gov/5500Search/";
pub const DEFAULT_MODAL_SIGNAL: &str = "Please try back later";

/// Everything the search session needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub search_url: String,
    pub target_year: String,
    /// Directory the browser downloads into.
    pub download_dir: PathBuf,
    /// Directory canonical artifacts are moved to.
    pub output_dir: PathBuf,
    pub expected_extension: String,
    /// Extension the browser gives in-progress downloads.
    pub partial_extension: String,
    pub modal_signal_text: String,
    /// Zero-based index of the year cell in a result row.
    pub year_column: usize,
    /// Zero-based index of the cell holding the download control.
    pub trigger_column: usize,
    pub max_query_words: usize,
    pub timings: SessionTimings,
}

impl SessionConfig {
    pub fn new(target_year: impl Into<String>, download_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            target_year: target_year.into(),
            download_dir,
            output_dir,
            expected_extension: "pdf".to_string(),
            partial_extension: "crdownload".to_string(),
            modal_signal_text: DEFAULT_MODAL_SIGNAL.to_string(),
            year_column: 2,
            trigger_column: 0,
            max_query_words: DEFAULT_MAX_QUERY_WORDS,
            timings: SessionTimings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimings {
    /// Wait for filter, search and breadcrumb controls.
    pub element_wait: PollBudget,
    /// Wait for the optional submit control; its absence is tolerated.
    pub submit_wait: PollBudget,
    pub results_wait: PollBudget,
    pub modal_probe: PollBudget,
    pub download_poll: PollBudget,
    pub stale_attempts: u32,
    pub stale_backoff: Duration,
    pub clear_attempts: u32,
    pub clear_backoff: Duration,
    /// Pause after typing the query and after each reset.
    pub settle_delay: Duration,
    pub recovery_attempts: u32,
}

impl Default for SessionTimings {
    fn default() -> Self {
        let tick = Duration::from_millis(250);
        Self {
            element_wait: PollBudget::from_timeout(Duration::from_secs(20), tick),
            submit_wait: PollBudget::from_timeout(Duration::from_secs(5), tick),
            results_wait: PollBudget::from_timeout(Duration::from_secs(10), tick),
            modal_probe: PollBudget::from_timeout(Duration::from_secs(3), tick),
            download_poll: PollBudget::new(Duration::from_millis(500), 80),
            stale_attempts: 3,
            stale_backoff: Duration::from_millis(800),
            clear_attempts: 3,
            clear_backoff: Duration::from_millis(400),
            settle_delay: Duration::from_millis(400),
            recovery_attempts: 2,
        }
    }
}
