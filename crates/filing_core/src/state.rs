/// Implicit position of the remote search interface.
///
/// Every entity must begin in [`UiState::FilterApplied`]; the session resets
/// to it after each outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    /// Nothing loaded yet, or the page was reloaded and not re-filtered.
    #[default]
    Unfiltered,
    /// Year filter active, no query term entered.
    FilterApplied,
    /// Query entered and results (possibly none) requested.
    ResultsShown,
    /// A blocking overlay is covering the page.
    Blocked,
}

impl UiState {
    pub fn is_ready_for_query(self) -> bool {
        self == UiState::FilterApplied
    }
}
