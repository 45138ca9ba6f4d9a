use filing_core::{BatchSummary, SearchOutcome};
use filing_engine::{EventSink, SessionEvent};

/// Prints per-entity progress lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: SessionEvent) {
        for line in status_lines(&event) {
            println!("{line}");
        }
    }
}

pub fn status_lines(event: &SessionEvent) -> Vec<String> {
    match event {
        SessionEvent::EntityStarted {
            index,
            entity,
            query,
        } => vec![
            format!("[{index}] {entity}"),
            format!("Searching: {query}"),
        ],
        SessionEvent::EntityFinished { outcome, .. } => match outcome {
            SearchOutcome::Found(path) => {
                vec!["Found".to_string(), format!("Saved: {}", path.display())]
            }
            SearchOutcome::NotFound(reason) => vec![format!("Not found ({reason})")],
            SearchOutcome::Error(cause) => vec![format!("Not found (error: {cause})")],
        },
        SessionEvent::Recovered { attempts, .. } => {
            vec![format!("Search page reloaded after {attempts} attempt(s)")]
        }
        SessionEvent::Ready | SessionEvent::ModalDismissed => Vec::new(),
    }
}

pub fn summary_line(summary: &BatchSummary) -> String {
    let mut line = format!(
        "Done: {} processed, {} found, {} not found ({} errors)",
        summary.processed,
        summary.found,
        summary.missing(),
        summary.errors
    );
    if summary.stopped_early {
        line.push_str(", stopped early");
    }
    line
}
