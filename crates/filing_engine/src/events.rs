use std::sync::mpsc;

use filing_core::SearchOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The filtered search page is ready for the first entity.
    Ready,
    EntityStarted {
        index: usize,
        entity: String,
        query: String,
    },
    EntityFinished {
        index: usize,
        entity: String,
        outcome: SearchOutcome,
    },
    /// The breadcrumb reset failed and the page was reloaded and re-filtered.
    Recovered { index: usize, attempts: u32 },
    ModalDismissed,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SessionEvent) {}
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<SessionEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}
