//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mapscrape_core::SessionSummary;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// `collected / target * 100`.
    pub percent: f64,
    pub collected: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Progress(ProgressEvent),
    Finished(SessionSummary),
}

/// Receives session events synchronously on the session's task.
pub trait ProgressSink {
    fn emit(&mut self, event: SessionEvent);
}

impl ProgressSink for Vec<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

impl ProgressSink for UnboundedSender<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        if self.send(event).is_err() {
            tracing::debug!("progress receiver dropped");
        }
    }
}

/// Shared stop flag, checked by the session between iterations.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
