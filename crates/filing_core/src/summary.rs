use crate::SearchOutcome;

/// Aggregate of a batch run, derived from the per-entity outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
    /// Set when the run stopped before exhausting its input.
    pub stopped_early: bool,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &SearchOutcome) {
        self.processed += 1;
        match outcome {
            SearchOutcome::Found(_) => self.found += 1,
            SearchOutcome::NotFound(_) => self.not_found += 1,
            SearchOutcome::Error(_) => self.errors += 1,
        }
    }

    /// Entities that did not produce a file, errors included.
    pub fn missing(&self) -> usize {
        self.not_found + self.errors
    }
}
