//! Worker → observer progress events over a bounded channel.

use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::types::{RunReport, TranscodeResult};

/// Message from the conversion worker to whoever observes the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// The file list is known; processing starts at `resume_from`
    Started { total: usize, resume_from: usize },
    /// `completed` counts files processed so far, including earlier segments
    Progress { completed: usize, total: usize },
    /// One file finished with the given result
    FileFinished { index: usize, result: TranscodeResult },
    /// The worker stopped; always the last event of a run
    Finished(RunReport),
}

/// Create a bounded event channel with the configured buffer size.
///
/// When the buffer is full the worker blocks, so a slow observer throttles
/// the run instead of letting events pile up.
pub fn event_channel(config: &PipelineConfig) -> (EventSender, mpsc::Receiver<BatchEvent>) {
    let (tx, rx) = mpsc::channel(config.event_buffer.max(1));
    (EventSender { tx: Some(tx) }, rx)
}

/// Sending half used from the blocking worker thread.
///
/// Once the observer goes away, further events are dropped and the run
/// carries on.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Option<mpsc::Sender<BatchEvent>>,
}

impl EventSender {
    /// Send from a non-async context, blocking while the buffer is full.
    pub fn send_blocking(&mut self, event: BatchEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.blocking_send(event).is_err() {
            tracing::debug!("Event receiver dropped; continuing without observer");
            self.tx = None;
        }
    }
}
