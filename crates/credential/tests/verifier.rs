//! Integration tests for verification, authorization and health.

mod common;

use std::sync::Arc;

use common::{ADMIN, STUDENT, certificate, config, ledger, plain_fields};
use pretty_assertions::assert_eq;
use skillpass_core::{Address, ContractConfig, ObjectId};
use skillpass_credential::{
    AuthorizationGuard, CertificateSummary, ContractStatus, CredentialVerifier, HealthCheck,
    VerificationOutcome, parse_verification_link,
};
use skillpass_ports::memory::LedgerOp;
use skillpass_ports::{LedgerError, RawObject};

#[tokio::test]
async fn missing_credential_is_not_found() {
    let ledger = ledger();
    let verifier = CredentialVerifier::new(ledger.clone());

    let outcome = verifier.lookup(&ObjectId::new("0xabc")).await;
    assert_eq!(outcome, VerificationOutcome::NotFound);
    assert_eq!(outcome.into_credential(), None);
}

#[tokio::test]
async fn lookup_failure_collapses_to_not_found_without_retry() {
    let ledger = ledger();
    ledger.fail_next(LedgerOp::Object, LedgerError::Connection("refused".into()));
    let verifier = CredentialVerifier::new(ledger.clone());

    let outcome = verifier.lookup(&ObjectId::new("0xabc")).await;
    assert!(matches!(outcome, VerificationOutcome::LookupFailed(ref m) if m.contains("refused")));
    assert_eq!(outcome.into_credential(), None);
    assert_eq!(ledger.calls(LedgerOp::Object), 1);
}

#[tokio::test]
async fn found_credential_links_back_to_itself() {
    let ledger = ledger();
    let config = config();
    ledger.insert_object(
        Some(Address::new(STUDENT)),
        certificate(&config, "0xc0ffee", plain_fields("BSc Physics", true)),
    );
    let verifier = CredentialVerifier::new(ledger.clone());

    let credential = verifier.verify(&ObjectId::new("0xC0FFEE")).await.unwrap();
    let summary = CertificateSummary::from_credential(&credential, "https://skillpass.app");

    assert_eq!(summary.degree, "BSc Physics");
    assert_eq!(summary.major, "Not specified");
    assert_eq!(
        parse_verification_link(&summary.verification_url),
        Some(credential.id)
    );
}

#[test]
fn is_admin_matches_configured_admin_only() {
    let guard = AuthorizationGuard::new(config());
    assert!(guard.is_admin(&Address::new(ADMIN)));
    assert!(!guard.is_admin(&Address::new("0xnotadmin")));
}

#[test]
fn secondary_admin_seam_is_opt_in() {
    let secondary = Address::new("0xsecondary");

    let without = AuthorizationGuard::new(config());
    assert!(!without.is_admin(&secondary));

    let with = AuthorizationGuard::new(Arc::new(ContractConfig {
        additional_admins: vec![secondary.clone()],
        ..(*config()).clone()
    }));
    assert!(with.is_admin(&secondary));
    assert!(with.is_admin(&Address::new(ADMIN)));
}

#[tokio::test]
async fn health_gates_on_package_presence() {
    let ledger = ledger();
    let config = config();
    let health = HealthCheck::new(ledger.clone(), config.package_id.clone());
    assert_eq!(health.check().await, ContractStatus::Invalid);

    ledger.insert_object(
        None,
        RawObject {
            object_id: config.package_id.clone(),
            type_tag: Some("package".into()),
            fields: None,
        },
    );
    assert_eq!(health.check().await, ContractStatus::Valid);
}
