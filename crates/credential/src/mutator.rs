//! Credential mutator
//!
//! Builds and submits the contract's ledger-mutating calls. Only presence of
//! required inputs is checked locally; business rules (who may issue, double
//! revocation) belong to the contract, and its rejection message is passed
//! back verbatim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skillpass_core::{Address, ContractConfig, ObjectId};
use skillpass_ports::{CallArg, LedgerClient, MoveCall, TxReceipt};
use tracing::{error, info, instrument};

use crate::error::{CredentialError, CredentialResult};

/// Entry function names of the credential contract.
pub mod functions {
    /// Plain issue.
    pub const MINT: &str = "mint_certificate";
    /// Encrypted-placeholder issue.
    pub const MINT_ENCRYPTED: &str = "mint_encrypted_certificate";
    /// Revoke.
    pub const REVOKE: &str = "revoke_certificate";
    /// Register a university.
    pub const ADD_UNIVERSITY: &str = "add_university";
    /// Deregister a university.
    pub const REMOVE_UNIVERSITY: &str = "remove_university";
}

/// Input of a plain issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Recipient.
    pub student_address: Address,
    /// Credential type, e.g. `BSc Computer Science`.
    pub credential_type: String,
    /// Optional grade.
    pub grade: Option<String>,
}

/// Input of an encrypted-placeholder issue.
///
/// The payloads are opaque; no encryption happens in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedIssueRequest {
    /// Recipient.
    pub student_address: Address,
    /// Encrypted credential type.
    pub encrypted_credential_type: Vec<u8>,
    /// Optional encrypted grade.
    pub encrypted_grade: Option<Vec<u8>>,
    /// Parameters of the encryption scheme.
    pub encryption_params: Vec<u8>,
    /// Hash of the key the payload was encrypted to.
    pub public_key_hash: Vec<u8>,
    /// Roles permitted to decrypt.
    pub access_policy: Vec<String>,
}

/// Submits credential mutations.
#[derive(Clone)]
pub struct CredentialMutator {
    ledger: Arc<dyn LedgerClient>,
    config: Arc<ContractConfig>,
}

impl std::fmt::Debug for CredentialMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialMutator")
            .field("package_id", &self.config.package_id)
            .field("module_name", &self.config.module_name)
            .finish_non_exhaustive()
    }
}

fn require(present: bool, field: &'static str) -> CredentialResult<()> {
    if present {
        Ok(())
    } else {
        Err(CredentialError::MissingField(field))
    }
}

impl CredentialMutator {
    /// Creates a mutator.
    pub fn new(ledger: Arc<dyn LedgerClient>, config: Arc<ContractConfig>) -> Self {
        Self { ledger, config }
    }

    /// Issues a plain credential.
    ///
    /// Call: `mint_certificate(registry, student, type bytes, Option<grade
    /// bytes>, clock)`. An empty grade is sent as `None`.
    ///
    /// # Errors
    ///
    /// `MissingField` for an empty student address or credential type,
    /// `Submission` if the ledger rejects the call.
    #[instrument(skip_all, fields(student = %request.student_address))]
    pub async fn issue(&self, request: IssueRequest) -> CredentialResult<TxReceipt> {
        require(!request.student_address.is_empty(), "student_address")?;
        require(!request.credential_type.is_empty(), "credential_type")?;

        let grade = request
            .grade
            .filter(|g| !g.is_empty())
            .map(String::into_bytes);
        let arguments = vec![
            CallArg::Object(self.config.registry_id.clone()),
            CallArg::Address(request.student_address),
            CallArg::Bytes(request.credential_type.into_bytes()),
            CallArg::OptionalBytes(grade),
            CallArg::Object(self.config.clock_object_id.clone()),
        ];
        self.submit(functions::MINT, arguments).await
    }

    /// Issues a credential with encrypted-placeholder payloads.
    ///
    /// Call: `mint_encrypted_certificate(registry, student, type, Option<grade>,
    /// params, key hash, policy JSON, clock)`.
    ///
    /// # Errors
    ///
    /// `MissingField` for an empty student, payload, parameter, key hash or
    /// policy, `Submission` if the ledger rejects the call.
    #[instrument(skip_all, fields(student = %request.student_address))]
    pub async fn issue_encrypted(
        &self,
        request: EncryptedIssueRequest,
    ) -> CredentialResult<TxReceipt> {
        require(!request.student_address.is_empty(), "student_address")?;
        require(
            !request.encrypted_credential_type.is_empty(),
            "encrypted_credential_type",
        )?;
        require(!request.encryption_params.is_empty(), "encryption_params")?;
        require(!request.public_key_hash.is_empty(), "public_key_hash")?;
        require(!request.access_policy.is_empty(), "access_policy")?;

        let policy = serde_json::to_string(&request.access_policy)?;
        let grade = request.encrypted_grade.filter(|g| !g.is_empty());
        let arguments = vec![
            CallArg::Object(self.config.registry_id.clone()),
            CallArg::Address(request.student_address),
            CallArg::Bytes(request.encrypted_credential_type),
            CallArg::OptionalBytes(grade),
            CallArg::Bytes(request.encryption_params),
            CallArg::Bytes(request.public_key_hash),
            CallArg::Text(policy),
            CallArg::Object(self.config.clock_object_id.clone()),
        ];
        self.submit(functions::MINT_ENCRYPTED, arguments).await
    }

    /// Revokes a credential. Irreversible once the submission succeeds.
    ///
    /// Call: `revoke_certificate(credential, reason)`.
    ///
    /// # Errors
    ///
    /// `MissingField` for an empty id or reason, `Submission` if the ledger
    /// rejects the call (including an already-revoked credential).
    #[instrument(skip_all, fields(credential_id = %credential_id))]
    pub async fn revoke(
        &self,
        credential_id: &ObjectId,
        reason: &str,
    ) -> CredentialResult<TxReceipt> {
        require(!credential_id.is_empty(), "credential_id")?;
        require(!reason.is_empty(), "reason")?;

        let arguments = vec![
            CallArg::Object(credential_id.clone()),
            CallArg::Text(reason.to_string()),
        ];
        self.submit(functions::REVOKE, arguments).await
    }

    pub(crate) fn registry_id(&self) -> &ObjectId {
        &self.config.registry_id
    }

    pub(crate) async fn submit(
        &self,
        function: &str,
        arguments: Vec<CallArg>,
    ) -> CredentialResult<TxReceipt> {
        let call = MoveCall {
            package: self.config.package_id.clone(),
            module: self.config.module_name.clone(),
            function: function.to_string(),
            arguments,
        };
        let target = call.target();

        match self.ledger.execute(call).await {
            Ok(receipt) => {
                info!(%target, digest = %receipt.digest, "transaction submitted");
                Ok(receipt)
            }
            Err(e) => {
                error!(%target, error = %e, "transaction failed");
                Err(CredentialError::Submission(e.to_string()))
            }
        }
    }
}
