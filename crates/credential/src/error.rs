//! Error types for credential operations

use skillpass_ports::LedgerError;
use skillpass_resilience::RetryError;
use thiserror::Error;

/// Result alias for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Errors raised by the credential layer.
///
/// An empty listing is never an error: "zero credentials" is `Ok(vec![])`,
/// while a read that failed after every retry is [`CredentialError::Fetch`].
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// A read failed on every attempt.
    #[error("{0}")]
    Fetch(RetryError<LedgerError>),

    /// The caller cancelled a read before it resolved.
    #[error("{operation} cancelled")]
    Cancelled {
        /// Operation that was cancelled.
        operation: String,
    },

    /// A required input was missing or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The caller may not perform this operation. Raised before any ledger
    /// interaction.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The contract has no such capability.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Submission failed. The message is the ledger's own, verbatim.
    #[error("{0}")]
    Submission(String),

    /// An argument could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Known reasons the contract rejects a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The configured package does not exist on the network.
    ContractMissing,
    /// The sender is not a registered university.
    UniversityNotAuthorized,
    /// Anything else.
    Other,
}

impl RejectionKind {
    /// Classifies a ledger rejection message.
    pub fn classify(message: &str) -> Self {
        if message
            .to_ascii_lowercase()
            .contains("package object does not exist")
        {
            Self::ContractMissing
        } else if message.contains("ENotAuthorizedUniversity") {
            Self::UniversityNotAuthorized
        } else {
            Self::Other
        }
    }

    /// Hint for a person reading the error.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::ContractMissing => {
                Some("the contract is not deployed on this network; check package_id")
            }
            Self::UniversityNotAuthorized => {
                Some("the sender is not registered as a university; ask the administrator")
            }
            Self::Other => None,
        }
    }
}

impl CredentialError {
    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a not-implemented error.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented(message.into())
    }

    /// Classification of a submission failure, `None` for other errors.
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Self::Submission(message) => Some(RejectionKind::classify(message)),
            _ => None,
        }
    }

    /// Returns `true` if the caller cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl From<RetryError<LedgerError>> for CredentialError {
    fn from(err: RetryError<LedgerError>) -> Self {
        match err {
            RetryError::Cancelled { operation, .. } => Self::Cancelled { operation },
            exhausted @ RetryError::Exhausted { .. } => Self::Fetch(exhausted),
        }
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn submission_message_is_verbatim() {
        let err = CredentialError::Submission("MoveAbort(ENotAuthorizedUniversity, 3)".into());
        assert_eq!(err.to_string(), "MoveAbort(ENotAuthorizedUniversity, 3)");
        assert_eq!(
            err.rejection_kind(),
            Some(RejectionKind::UniversityNotAuthorized)
        );
    }

    #[test]
    fn missing_package_is_classified() {
        let err = CredentialError::Submission(
            "Package object does not exist with ID 0xf1cb".into(),
        );
        assert_eq!(err.rejection_kind(), Some(RejectionKind::ContractMissing));
        assert!(RejectionKind::ContractMissing.hint().is_some());
    }

    #[test]
    fn other_errors_have_no_rejection_kind() {
        assert_eq!(
            CredentialError::MissingField("student_address").rejection_kind(),
            None
        );
        assert_eq!(
            RejectionKind::classify("InsufficientGas"),
            RejectionKind::Other
        );
    }

    #[test]
    fn retry_errors_convert() {
        let exhausted: CredentialError = RetryError::Exhausted {
            operation: "owned_credentials".into(),
            attempts: 4,
            last: LedgerError::Connection("refused".into()),
        }
        .into();
        assert!(exhausted.to_string().contains("retries exhausted"));

        let cancelled: CredentialError = RetryError::<LedgerError>::Cancelled {
            operation: "issued_credentials".into(),
            attempts: 1,
        }
        .into();
        assert!(cancelled.is_cancelled());
    }
}
