//! Authorization guard
//!
//! Admin checks compare against the configured administrator and the
//! explicit `additional_admins` allow-list. University checks go through
//! [`UniversityRegistry`]; the only implementation today is
//! [`StaticUniversityRegistry`], a stub over a configured list. A registry
//! backed by an on-chain lookup is expected to replace it.

use std::sync::Arc;

use async_trait::async_trait;
use skillpass_core::{Address, ContractConfig};
use tracing::{debug, warn};

use crate::error::{CredentialError, CredentialResult};

/// Source of truth for which addresses may issue credentials.
#[async_trait]
pub trait UniversityRegistry: Send + Sync {
    /// Returns `true` if `address` is a registered university.
    async fn is_authorized(&self, address: &Address) -> bool;
}

/// Stub registry over a fixed list.
///
/// Does not consult the on-chain registry: an address added through
/// `add_university` is not seen here until it is also configured.
#[derive(Debug, Clone, Default)]
pub struct StaticUniversityRegistry {
    universities: Vec<Address>,
}

impl StaticUniversityRegistry {
    /// Registry over `universities`.
    pub fn new(universities: impl IntoIterator<Item = Address>) -> Self {
        Self {
            universities: universities.into_iter().collect(),
        }
    }

    /// Registry over `authorized_universities` from the configuration.
    pub fn from_config(config: &ContractConfig) -> Self {
        Self::new(config.authorized_universities.iter().cloned())
    }
}

#[async_trait]
impl UniversityRegistry for StaticUniversityRegistry {
    async fn is_authorized(&self, address: &Address) -> bool {
        !address.is_empty() && self.universities.contains(address)
    }
}

/// Decides whether a caller may perform guarded operations.
#[derive(Clone)]
pub struct AuthorizationGuard {
    config: Arc<ContractConfig>,
    universities: Arc<dyn UniversityRegistry>,
}

impl std::fmt::Debug for AuthorizationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGuard")
            .field("admin_address", &self.config.admin_address)
            .field("additional_admins", &self.config.additional_admins)
            .finish_non_exhaustive()
    }
}

impl AuthorizationGuard {
    /// Guard using the static registry from the configuration.
    pub fn new(config: Arc<ContractConfig>) -> Self {
        let universities = Arc::new(StaticUniversityRegistry::from_config(&config));
        Self {
            config,
            universities,
        }
    }

    /// Replaces the university registry.
    #[must_use]
    pub fn with_registry(mut self, universities: Arc<dyn UniversityRegistry>) -> Self {
        self.universities = universities;
        self
    }

    /// Returns `true` iff `address` is the configured administrator.
    pub fn is_primary_admin(&self, address: &Address) -> bool {
        !address.is_empty() && *address == self.config.admin_address
    }

    /// Returns `true` iff `address` is the administrator or listed in
    /// `additional_admins`.
    pub fn is_admin(&self, address: &Address) -> bool {
        if address.is_empty() {
            return false;
        }
        self.is_primary_admin(address) || self.config.additional_admins.contains(address)
    }

    /// Returns `true` if `address` may issue credentials.
    pub async fn is_authorized_university(&self, address: &Address) -> bool {
        self.universities.is_authorized(address).await
    }

    /// Fails with `Unauthorized` unless `caller` is an admin.
    ///
    /// # Errors
    ///
    /// [`CredentialError::Unauthorized`] naming `action`.
    pub fn require_admin(&self, caller: &Address, action: &str) -> CredentialResult<()> {
        if self.is_admin(caller) {
            debug!(%caller, action, "admin check passed");
            Ok(())
        } else {
            warn!(%caller, action, "admin check failed");
            Err(CredentialError::unauthorized(format!(
                "only an administrator can {action}"
            )))
        }
    }

    /// Transfers the administrator role.
    ///
    /// The contract has no such entry function, so this always fails.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for a non-admin caller, otherwise `NotImplemented`.
    pub fn transfer_admin(&self, caller: &Address, new_admin: &Address) -> CredentialResult<()> {
        self.require_admin(caller, "transfer the admin role")?;
        warn!(%caller, %new_admin, "admin transfer requested but not supported by the contract");
        Err(CredentialError::not_implemented("transfer_admin"))
    }
}
