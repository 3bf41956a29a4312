//! Retry lifecycle events.
//!
//! Observers receive a [`RetryEvent`] for every failed attempt that will be
//! retried and for the final outcome. Events are informational only: an
//! observer cannot influence the retry loop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// Something that happened inside a retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    /// An attempt failed and another one is scheduled after `delay`.
    Retrying {
        /// Operation name.
        operation: String,
        /// 1-based number of the attempt that failed.
        attempt: u32,
        /// Total attempts allowed.
        max_attempts: u32,
        /// Wait before the next attempt.
        delay: Duration,
        /// Rendered error of the failed attempt.
        error: String,
    },
    /// An attempt succeeded.
    Succeeded {
        /// Operation name.
        operation: String,
        /// Attempts made, the successful one included.
        attempts: u32,
    },
    /// The final attempt failed.
    Exhausted {
        /// Operation name.
        operation: String,
        /// Attempts made.
        attempts: u32,
        /// Rendered error of the final attempt.
        error: String,
    },
    /// The caller cancelled.
    Cancelled {
        /// Operation name.
        operation: String,
        /// Attempts started.
        attempts: u32,
    },
}

impl RetryEvent {
    /// Operation the event belongs to.
    pub fn operation(&self) -> &str {
        match self {
            Self::Retrying { operation, .. }
            | Self::Succeeded { operation, .. }
            | Self::Exhausted { operation, .. }
            | Self::Cancelled { operation, .. } => operation,
        }
    }
}

/// Receives retry events.
pub trait RetryObserver: Send + Sync {
    /// Called synchronously from the retry loop; keep it cheap.
    fn on_event(&self, event: &RetryEvent);
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<RetryEvent>>>,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far.
    pub fn events(&self) -> Vec<RetryEvent> {
        self.events.lock().clone()
    }

    /// Delays of every scheduled retry, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RetryEvent::Retrying { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect()
    }
}

impl RetryObserver for EventLog {
    fn on_event(&self, event: &RetryEvent) {
        self.events.lock().push(event.clone());
    }
}
