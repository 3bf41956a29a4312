//! Error type for ledger client operations.
//!
//! Drivers map their transport and node errors into these variants so the
//! credential layer can report failures without knowing the concrete client.

use std::time::Duration;

/// Error type for all [`LedgerClient`](crate::LedgerClient) operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// Entity not found where absence is an error (e.g. revoking a
    /// non-existent object). Plain lookups return `Ok(None)` instead.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity.
        entity: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// Network or node connection failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// The node did not answer in time.
    #[error("timeout: {operation} after {duration:?}")]
    Timeout {
        /// Operation that timed out.
        operation: String,
        /// How long was waited.
        duration: Duration,
    },

    /// The contract or the node rejected a transaction. The message is the
    /// node's own and is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),

    /// A response could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The client cannot perform this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Catch-all.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Convenience constructor for [`LedgerError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Convenience constructor for [`LedgerError::Timeout`].
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Convenience constructor for [`LedgerError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
