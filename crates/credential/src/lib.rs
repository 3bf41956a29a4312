//! Skillpass Credential - credential access layer
//!
//! Reads, decodes, constructs and submits ledger-resident academic
//! credentials through a [`LedgerClient`](skillpass_ports::LedgerClient).
//!
//! # Components
//!
//! - [`decoder`] - total decoding of heterogeneous on-chain fields
//! - [`CredentialRepository`] - owned and issued listings, retried as a whole
//! - [`CredentialVerifier`] - single best-effort lookup by id
//! - [`CredentialMutator`] - issue, issue encrypted, revoke
//! - [`AuthorizationGuard`] and [`RegistryAdmin`] - admin and university gating
//! - [`HealthCheck`] - is the contract package deployed
//! - [`Query`] - `{data, loading, error}` state for presentation layers
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Registry administration
pub mod admin;
/// Field decoder
pub mod decoder;
/// Errors
pub mod error;
/// Authorization guard
pub mod guard;
/// Contract health check
pub mod health;
/// Verification deep links
pub mod link;
/// Raw and normalized credential types
pub mod model;
/// Credential mutations
pub mod mutator;
/// Query state
pub mod query;
/// Credential listings
pub mod repository;
/// Display summaries
pub mod summary;
/// Single-credential verification
pub mod verifier;

pub use admin::RegistryAdmin;
pub use error::{CredentialError, CredentialResult, RejectionKind};
pub use guard::{AuthorizationGuard, StaticUniversityRegistry, UniversityRegistry};
pub use health::{ContractStatus, HealthCheck};
pub use link::{parse_verification_link, verification_url};
pub use model::{CredentialRecord, NormalizedCredential, RawField};
pub use mutator::{CredentialMutator, EncryptedIssueRequest, IssueRequest};
pub use query::{Query, QueryState};
pub use repository::CredentialRepository;
pub use summary::CertificateSummary;
pub use verifier::{CredentialVerifier, VerificationOutcome};
