//! Error types for retried operations

use thiserror::Error;

/// Terminal outcome of a retried operation that did not succeed.
#[derive(Debug, Clone, Error)]
pub enum RetryError<E> {
    /// Every attempt failed.
    #[error("{operation} failed after {attempts} attempts, retries exhausted: {last}")]
    Exhausted {
        /// Name of the operation.
        operation: String,
        /// Attempts made, the first one included.
        attempts: u32,
        /// Error of the final attempt.
        last: E,
    },

    /// The caller cancelled the operation before it resolved.
    #[error("{operation} cancelled after {attempts} attempts")]
    Cancelled {
        /// Name of the operation.
        operation: String,
        /// Attempts started before cancellation.
        attempts: u32,
    },
}

impl<E> RetryError<E> {
    /// Attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// Returns `true` if the caller cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The final attempt's error, if any attempt failed on its own.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Cancelled { .. } => None,
        }
    }
}
