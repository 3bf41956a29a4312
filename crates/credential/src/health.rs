//! Contract health check.
//!
//! Confirms that the configured package exists on the network. Callers use
//! the status to decide whether mutations are offered at all.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use skillpass_core::ObjectId;
use skillpass_ports::LedgerClient;
use tracing::{info, warn};

/// Deployment status of the contract package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    /// Not checked yet.
    #[default]
    Unknown,
    /// The package exists.
    Valid,
    /// The package is missing or the lookup failed.
    Invalid,
}

impl ContractStatus {
    /// Returns `true` for [`ContractStatus::Valid`].
    pub fn allows_mutations(self) -> bool {
        self == Self::Valid
    }
}

/// Checks the contract package, remembering the last result.
pub struct HealthCheck {
    ledger: Arc<dyn LedgerClient>,
    package_id: ObjectId,
    status: RwLock<ContractStatus>,
}

impl std::fmt::Debug for HealthCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheck")
            .field("package_id", &self.package_id)
            .field("status", &*self.status.read())
            .finish_non_exhaustive()
    }
}

impl HealthCheck {
    /// Health check for `package_id`, initially [`ContractStatus::Unknown`].
    pub fn new(ledger: Arc<dyn LedgerClient>, package_id: ObjectId) -> Self {
        Self {
            ledger,
            package_id,
            status: RwLock::new(ContractStatus::Unknown),
        }
    }

    /// Last known status.
    pub fn status(&self) -> ContractStatus {
        *self.status.read()
    }

    /// Looks up the package once (no retry) and records the result.
    pub async fn check(&self) -> ContractStatus {
        let status = match self.ledger.object(&self.package_id).await {
            Ok(Some(_)) => {
                info!(package_id = %self.package_id, "contract package found");
                ContractStatus::Valid
            }
            Ok(None) => {
                warn!(package_id = %self.package_id, "contract package not found");
                ContractStatus::Invalid
            }
            Err(error) => {
                warn!(package_id = %self.package_id, error = %error, "contract check failed");
                ContractStatus::Invalid
            }
        };
        *self.status.write() = status;
        status
    }
}
