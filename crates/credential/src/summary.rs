//! Presentation summary of a credential.

use chrono::DateTime;
use serde::Serialize;
use skillpass_core::ObjectId;

use crate::link::verification_url;
use crate::model::NormalizedCredential;

/// Characters kept when shortening an address for display.
pub const SHORT_HANDLE_LEN: usize = 8;

/// What a certificate card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateSummary {
    /// Credential id.
    pub id: ObjectId,
    /// Shortened holder address.
    pub student: String,
    /// Credential type.
    pub degree: String,
    /// Grade.
    pub major: String,
    /// Shortened issuer address.
    pub issuing_university: String,
    /// Issue date as `YYYY-MM-DD` (UTC), empty if out of range.
    pub issue_date: String,
    /// Whether the credential was revoked.
    pub is_revoked: bool,
    /// Shareable verification link.
    pub verification_url: String,
}

impl CertificateSummary {
    /// Builds the summary; `origin` is the base of the verification link.
    pub fn from_credential(credential: &NormalizedCredential, origin: &str) -> Self {
        Self {
            id: credential.id.clone(),
            student: credential.student_address.shortened(SHORT_HANDLE_LEN),
            degree: credential.credential_type.clone(),
            major: credential.grade.clone(),
            issuing_university: credential.issuer_address.shortened(SHORT_HANDLE_LEN),
            issue_date: iso_date(credential.issue_date),
            is_revoked: credential.is_revoked(),
            verification_url: verification_url(origin, &credential.id),
        }
    }
}

fn iso_date(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skillpass_core::Address;

    fn credential() -> NormalizedCredential {
        NormalizedCredential {
            id: ObjectId::new("0xc1"),
            student_address: Address::new("0x1234567890abcdef"),
            issuer_address: Address::new("0xfedcba0987654321"),
            credential_type: "BSc Computer Science".into(),
            grade: "First".into(),
            encrypted_credential_type: None,
            encrypted_grade: None,
            encryption_params: None,
            public_key_hash: None,
            access_policy: None,
            issue_date: 1_718_000_000_000,
            evidence_blob: None,
            is_valid: false,
        }
    }

    #[test]
    fn summary_projection() {
        let summary = CertificateSummary::from_credential(&credential(), "https://skillpass.app");
        assert_eq!(summary.student, "0x123456...");
        assert_eq!(summary.issuing_university, "0xfedcba...");
        assert_eq!(summary.degree, "BSc Computer Science");
        assert_eq!(summary.major, "First");
        assert_eq!(summary.issue_date, "2024-06-10");
        assert!(summary.is_revoked);
        assert_eq!(summary.verification_url, "https://skillpass.app/verify/0xc1");
    }

    #[test]
    fn epoch_zero_renders() {
        assert_eq!(iso_date(0), "1970-01-01");
    }
}
