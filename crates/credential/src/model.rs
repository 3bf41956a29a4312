//! Credential data model

use serde::{Deserialize, Serialize};
use skillpass_core::{Address, ObjectId};

/// A loosely-encoded on-chain field, classified once at the boundary.
///
/// Nodes render the same logical field as a string, as a byte vector, as a
/// one-element option wrapper, or not at all. Encrypted payloads are tagged
/// separately so that precedence rules never need to re-inspect JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawField {
    /// Missing, null, or empty.
    #[default]
    Absent,
    /// Already a string.
    Text(String),
    /// A byte vector that should hold UTF-8.
    Bytes(Vec<u8>),
    /// A non-empty opaque encrypted payload.
    Encrypted(Vec<u8>),
}

impl RawField {
    /// Returns `true` for [`RawField::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Raw bytes of the field, if any.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Absent => None,
            Self::Text(text) => Some(text.into_bytes()),
            Self::Bytes(bytes) | Self::Encrypted(bytes) => Some(bytes),
        }
    }
}

/// A credential object as read from the ledger, fields classified but not
/// yet resolved for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Object id.
    pub id: ObjectId,
    /// Holder.
    pub student_address: Address,
    /// Issuing institution.
    pub issuer_address: Address,
    /// Plain credential type.
    pub credential_type: RawField,
    /// Plain grade.
    pub grade: RawField,
    /// Encrypted credential type.
    pub encrypted_credential_type: RawField,
    /// Encrypted grade.
    pub encrypted_grade: RawField,
    /// Parameters of the encryption scheme.
    pub encryption_params: Option<Vec<u8>>,
    /// Hash of the key the payload was encrypted to.
    pub public_key_hash: Option<Vec<u8>>,
    /// Serialized list of permitted roles.
    pub access_policy: Option<String>,
    /// Mint time, milliseconds since the Unix epoch.
    pub issue_date: u64,
    /// External evidence reference.
    pub evidence_blob: Option<Vec<u8>>,
    /// `false` once revoked.
    pub is_valid: bool,
}

/// Display-ready projection of a [`CredentialRecord`].
///
/// Built fresh on every decode and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCredential {
    /// Object id.
    pub id: ObjectId,
    /// Holder.
    pub student_address: Address,
    /// Issuing institution.
    pub issuer_address: Address,
    /// Decoded type, `[ENCRYPTED]`, or `Unknown Credential`.
    pub credential_type: String,
    /// Decoded grade, `[ENCRYPTED]`, or `Not specified`.
    pub grade: String,
    /// Encrypted type payload, carried through.
    pub encrypted_credential_type: Option<Vec<u8>>,
    /// Encrypted grade payload, carried through.
    pub encrypted_grade: Option<Vec<u8>>,
    /// Encryption parameters, carried through.
    pub encryption_params: Option<Vec<u8>>,
    /// Public key hash, carried through.
    pub public_key_hash: Option<Vec<u8>>,
    /// Access policy, carried through.
    pub access_policy: Option<String>,
    /// Mint time, milliseconds since the Unix epoch.
    pub issue_date: u64,
    /// Evidence reference, carried through.
    pub evidence_blob: Option<Vec<u8>>,
    /// `false` once revoked.
    pub is_valid: bool,
}

impl NormalizedCredential {
    /// Returns `true` once the credential has been revoked.
    pub fn is_revoked(&self) -> bool {
        !self.is_valid
    }

    /// Returns `true` if either display field came from an encrypted payload.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted_credential_type.is_some() || self.encrypted_grade.is_some()
    }
}
