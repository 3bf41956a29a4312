//! University registry administration.
//!
//! Both operations are admin-gated: a non-admin caller is rejected before
//! anything is sent to the ledger.

use skillpass_core::Address;
use skillpass_ports::{CallArg, TxReceipt};
use tracing::instrument;

use crate::error::{CredentialError, CredentialResult};
use crate::guard::AuthorizationGuard;
use crate::mutator::{CredentialMutator, functions};

/// Adds and removes universities from the on-chain registry.
#[derive(Debug, Clone)]
pub struct RegistryAdmin {
    guard: AuthorizationGuard,
    mutator: CredentialMutator,
}

impl RegistryAdmin {
    /// Creates the admin facade.
    pub fn new(guard: AuthorizationGuard, mutator: CredentialMutator) -> Self {
        Self { guard, mutator }
    }

    /// Registers `university`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for a non-admin caller, `MissingField` for an empty
    /// address, `Submission` if the ledger rejects the call.
    #[instrument(skip_all, fields(%caller, %university))]
    pub async fn add_university(
        &self,
        caller: &Address,
        university: &Address,
    ) -> CredentialResult<TxReceipt> {
        self.guard.require_admin(caller, "add universities")?;
        self.registry_call(functions::ADD_UNIVERSITY, university)
            .await
    }

    /// Deregisters `university`.
    ///
    /// # Errors
    ///
    /// As for [`add_university`](Self::add_university).
    #[instrument(skip_all, fields(%caller, %university))]
    pub async fn remove_university(
        &self,
        caller: &Address,
        university: &Address,
    ) -> CredentialResult<TxReceipt> {
        self.guard.require_admin(caller, "remove universities")?;
        self.registry_call(functions::REMOVE_UNIVERSITY, university)
            .await
    }

    /// The guard this facade checks against.
    pub fn guard(&self) -> &AuthorizationGuard {
        &self.guard
    }

    async fn registry_call(
        &self,
        function: &str,
        university: &Address,
    ) -> CredentialResult<TxReceipt> {
        if university.is_empty() {
            return Err(CredentialError::MissingField("university"));
        }
        let arguments = vec![
            CallArg::Object(self.mutator.registry_id().clone()),
            CallArg::Address(university.clone()),
        ];
        self.mutator.submit(function, arguments).await
    }
}
