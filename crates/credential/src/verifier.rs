//! Public verification by credential id.
//!
//! A single best-effort lookup, never retried. Absence and lookup failure are
//! kept apart in [`VerificationOutcome`] for logging, and collapse to the
//! same "not found" state through [`VerificationOutcome::into_credential`].

use std::sync::Arc;

use skillpass_core::ObjectId;
use skillpass_ports::LedgerClient;
use tracing::{info, instrument, warn};

use crate::decoder;
use crate::model::NormalizedCredential;

/// Result of a verification lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The credential exists and decoded.
    Found(NormalizedCredential),
    /// No object with this id, or the object is not a credential.
    NotFound,
    /// The lookup itself failed.
    LookupFailed(String),
}

impl VerificationOutcome {
    /// The credential, or `None` for both not-found and failed lookups.
    pub fn into_credential(self) -> Option<NormalizedCredential> {
        match self {
            Self::Found(credential) => Some(credential),
            Self::NotFound | Self::LookupFailed(_) => None,
        }
    }

    /// Returns `true` if the credential was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Looks up single credentials.
#[derive(Clone)]
pub struct CredentialVerifier {
    ledger: Arc<dyn LedgerClient>,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    /// Creates a verifier.
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Looks up `id` once.
    #[instrument(skip_all, fields(credential_id = %id))]
    pub async fn lookup(&self, id: &ObjectId) -> VerificationOutcome {
        if id.is_empty() {
            return VerificationOutcome::NotFound;
        }

        match self.ledger.object(id).await {
            Ok(Some(object)) => match decoder::decode(&object) {
                Some(credential) => {
                    info!(is_valid = credential.is_valid, "credential verified");
                    VerificationOutcome::Found(credential)
                }
                None => {
                    info!("object has no credential fields");
                    VerificationOutcome::NotFound
                }
            },
            Ok(None) => {
                info!("credential not found");
                VerificationOutcome::NotFound
            }
            Err(error) => {
                warn!(error = %error, "verification lookup failed");
                VerificationOutcome::LookupFailed(error.to_string())
            }
        }
    }

    /// Looks up `id`; `None` when it is absent or the lookup failed.
    pub async fn verify(&self, id: &ObjectId) -> Option<NormalizedCredential> {
        self.lookup(id).await.into_credential()
    }
}
