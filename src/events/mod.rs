//! Domain-level progress events
//!
//! The engine is a single producer emitting an ordered event stream: zero or
//! more `Status`/`Total`/`Progress` events followed by exactly one terminal
//! event (`Complete` or `Error`). Consumers must treat the terminal event as
//! end-of-stream. This channel is distinct from the tracing log sink; it
//! carries the events the transport layer forwards to clients.

use crate::extract::AuctionRecord;
use crate::output::stats::PriceStatistics;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// Terminal payload of a successful run
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Accepted records, sorted by end time descending
    pub items: Vec<AuctionRecord>,

    pub total_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<PriceStatistics>,
}

/// Lifecycle events emitted while a search runs
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    Status {
        message: String,
    },
    Total {
        total: usize,
        message: String,
    },
    Progress {
        current: usize,
        total: usize,
        percentage: u32,
    },
    Complete {
        data: SearchOutcome,
    },
    Error {
        error: String,
        details: String,
    },
}

impl ProgressEvent {
    /// Builds a per-item progress event with a rounded percentage
    pub fn progress(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((current as f64 / total as f64) * 100.0).round() as u32
        };
        ProgressEvent::Progress {
            current,
            total,
            percentage,
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Complete { .. } | ProgressEvent::Error { .. }
        )
    }
}

/// Single-producer sink for progress events
///
/// Enforces the stream discipline: after a terminal event has been emitted,
/// further sends are dropped. If the consumer has gone away (receiver
/// dropped), sends become no-ops and the run's cancellation token is
/// tripped so the engine stops scheduling new work.
pub struct EventSink {
    tx: UnboundedSender<ProgressEvent>,
    terminated: AtomicBool,
    cancel: CancellationToken,
}

impl EventSink {
    /// Creates a sink/receiver pair tied to the given cancellation token
    pub fn channel(cancel: CancellationToken) -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                terminated: AtomicBool::new(false),
                cancel,
            },
            rx,
        )
    }

    /// Emits an event, honoring the terminal-event discipline
    pub fn emit(&self, event: ProgressEvent) {
        if self.terminated.load(Ordering::Acquire) {
            tracing::debug!(?event, "event after terminal, dropped");
            return;
        }

        if event.is_terminal() {
            self.terminated.store(true, Ordering::Release);
        }

        if self.tx.send(event).is_err() {
            tracing::debug!("event consumer went away, cancelling run");
            self.cancel.cancel();
        }
    }

    /// Whether a terminal event has already been emitted
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}
