//! Events sent from the batch worker to the host thread.

use crate::progress::BatchResult;
use tokio::sync::mpsc;

/// Progress and state notifications of a running batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Percentage of files handled, 0.0 to 100.0
    Progress(f64),
    /// Human-readable status line
    Status(String),
    /// Final outcome, sent exactly once per batch
    Complete(BatchResult),
}

impl BatchEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, BatchEvent::Complete(_))
    }

    /// Dispatch to the matching sink callback
    pub fn deliver(&self, sink: &dyn ProgressSink) {
        match self {
            BatchEvent::Progress(percent) => sink.on_progress(*percent),
            BatchEvent::Status(message) => sink.on_status(message),
            BatchEvent::Complete(result) => sink.on_complete(result),
        }
    }
}

/// Host-side consumer of batch events (progress bar, JSON lines, ...)
pub trait ProgressSink {
    fn on_progress(&self, percent: f64);
    fn on_status(&self, message: &str);
    fn on_complete(&self, result: &BatchResult);
}

pub type EventSender = mpsc::UnboundedSender<BatchEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BatchEvent>;

/// Unbounded so that the worker never blocks on a slow host
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
