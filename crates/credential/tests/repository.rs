//! Integration tests for the owned and issued read paths.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{STUDENT, UNIVERSITY, certificate, config, ledger, quick_retry, seed_issued};
use pretty_assertions::assert_eq;
use serde_json::json;
use skillpass_core::{Address, ObjectId};
use skillpass_credential::decoder::ENCRYPTED_MARKER;
use skillpass_credential::{CredentialError, CredentialRepository};
use skillpass_ports::LedgerError;
use skillpass_ports::memory::{InMemoryLedger, LedgerOp};
use skillpass_resilience::{CancellationToken, EventLog, RetryEvent, RetryPolicy};

fn repository(ledger: &Arc<InMemoryLedger>) -> CredentialRepository {
    CredentialRepository::new(ledger.clone(), config()).with_retry_policy(quick_retry())
}

#[tokio::test]
async fn owned_plain_and_encrypted_credentials() {
    // GIVEN: address A owns a plain valid credential and an encrypted revoked one
    let ledger = ledger();
    let config = config();
    let owner = Address::new("0xa");
    ledger.insert_object(
        Some(owner.clone()),
        certificate(&config, "0x1", json!({
            "credential_type": "BSc Computer Science".as_bytes(),
            "is_valid": true,
        })),
    );
    ledger.insert_object(
        Some(owner.clone()),
        certificate(&config, "0x2", json!({
            "encrypted_credential_type": [7, 1, 3, 3, 7],
            "encryption_params": [1],
            "public_key_hash": [2],
            "is_valid": false,
        })),
    );

    // WHEN: the owned path runs
    let credentials = repository(&ledger)
        .owned_credentials(&owner, &CancellationToken::new())
        .await
        .unwrap();

    // THEN: both come back normalized
    let summary: Vec<(String, bool)> = credentials
        .iter()
        .map(|c| (c.credential_type.clone(), c.is_revoked()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("BSc Computer Science".to_string(), false),
            (ENCRYPTED_MARKER.to_string(), true),
        ]
    );
}

#[tokio::test]
async fn empty_owner_makes_no_call() {
    let ledger = ledger();
    let credentials = repository(&ledger)
        .owned_credentials(&Address::new("  "), &CancellationToken::new())
        .await
        .unwrap();

    assert!(credentials.is_empty());
    assert_eq!(ledger.calls(LedgerOp::OwnedObjects), 0);
}

#[tokio::test]
async fn owned_path_follows_every_page() {
    let ledger = Arc::new(InMemoryLedger::new().with_page_size(2));
    let config = config();
    let owner = Address::new(STUDENT);
    for i in 0..5 {
        ledger.insert_object(
            Some(owner.clone()),
            certificate(&config, &format!("0x{i}"), common::plain_fields("MSc", true)),
        );
    }

    let credentials = repository(&ledger)
        .owned_credentials(&owner, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(credentials.len(), 5);
    assert_eq!(ledger.calls(LedgerOp::OwnedObjects), 3);
}

#[tokio::test]
async fn zero_credentials_is_not_an_error() {
    let ledger = ledger();
    let result = repository(&ledger)
        .owned_credentials(&Address::new("0xnobody"), &CancellationToken::new())
        .await;
    assert!(matches!(result, Ok(ref v) if v.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn owned_path_recovers_after_three_failures() {
    let ledger = ledger();
    let config = config();
    let owner = Address::new(STUDENT);
    ledger.insert_object(Some(owner.clone()), certificate(&config, "0x1", common::plain_fields("BA", true)));
    ledger.fail_times(LedgerOp::OwnedObjects, 3, LedgerError::Connection("reset".into()));

    let log = EventLog::new();
    let repo = CredentialRepository::new(ledger.clone(), config)
        .with_retry_policy(RetryPolicy::default().with_observer(Arc::new(log.clone())));

    let credentials = repo
        .owned_credentials(&owner, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(credentials.len(), 1);
    assert_eq!(ledger.calls(LedgerOp::OwnedObjects), 4);
    assert_eq!(
        log.delays(),
        vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(3)]
    );
}

#[tokio::test]
async fn exhausted_retries_surface_fetch_error() {
    let ledger = ledger();
    ledger.fail_times(LedgerOp::OwnedObjects, 4, LedgerError::Connection("refused".into()));

    let err = repository(&ledger)
        .owned_credentials(&Address::new(STUDENT), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CredentialError::Fetch(_)));
    assert!(err.to_string().contains("retries exhausted"));
    assert_eq!(ledger.calls(LedgerOp::OwnedObjects), 4);
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_retry_halts_attempts() {
    let ledger = ledger();
    ledger.fail_times(LedgerOp::QueryEvents, 4, LedgerError::Connection("down".into()));
    let repo = CredentialRepository::new(ledger.clone(), config());
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            repo.issued_credentials(&Address::new(UNIVERSITY), &cancel)
                .await
        }
    });

    // first attempt fails at t=0, the second would start at t=1s
    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(ledger.calls(LedgerOp::QueryEvents), 1);
}

#[tokio::test]
async fn issued_path_omits_failed_lookups() {
    // GIVEN: five credentials issued by the university, the third unreadable
    let ledger = ledger();
    let config = config();
    let ids: Vec<String> = (1..=5).map(|i| format!("0x{i}")).collect();
    for id in &ids {
        seed_issued(&ledger, &config, STUDENT, id, "BSc");
    }
    ledger.break_object(ObjectId::new(&ids[2]), LedgerError::Connection("timeout".into()));

    // WHEN: the issued path runs
    let credentials = repository(&ledger)
        .issued_credentials(&Address::new(UNIVERSITY), &CancellationToken::new())
        .await
        .unwrap();

    // THEN: four credentials, newest first, #3 missing, no retry of the batch
    let found: Vec<ObjectId> = credentials.iter().map(|c| c.id.clone()).collect();
    assert_eq!(
        found,
        vec![
            ObjectId::new("0x5"),
            ObjectId::new("0x4"),
            ObjectId::new("0x2"),
            ObjectId::new("0x1"),
        ]
    );
    assert_eq!(ledger.calls(LedgerOp::QueryEvents), 1);
    assert_eq!(ledger.calls(LedgerOp::Object), 5);
}

#[tokio::test]
async fn issued_path_ignores_other_issuers() {
    let ledger = ledger();
    let config = config();
    seed_issued(&ledger, &config, STUDENT, "0x1", "BSc");

    let credentials = repository(&ledger)
        .issued_credentials(&Address::new("0xelsewhere"), &CancellationToken::new())
        .await
        .unwrap();

    assert!(credentials.is_empty());
    assert_eq!(ledger.calls(LedgerOp::Object), 0);
}

#[tokio::test]
async fn concurrent_reads_do_not_interfere() {
    let ledger = ledger();
    let config = config();
    seed_issued(&ledger, &config, STUDENT, "0x1", "BSc");
    seed_issued(&ledger, &config, STUDENT, "0x2", "MSc");
    let repo = repository(&ledger);
    let cancel = CancellationToken::new();

    let student = Address::new(STUDENT);
    let university = Address::new(UNIVERSITY);
    let (owned, issued) = tokio::join!(
        repo.owned_credentials(&student, &cancel),
        repo.issued_credentials(&university, &cancel),
    );

    assert_eq!(owned.unwrap().len(), 2);
    assert_eq!(issued.unwrap().len(), 2);
}

#[tokio::test]
async fn retry_events_name_the_operation() {
    let ledger = ledger();
    ledger.fail_next(LedgerOp::QueryEvents, LedgerError::Connection("blip".into()));
    let log = EventLog::new();
    let repo = CredentialRepository::new(ledger.clone(), config())
        .with_retry_policy(quick_retry().with_observer(Arc::new(log.clone())));

    repo.issued_credentials(&Address::new(UNIVERSITY), &CancellationToken::new())
        .await
        .unwrap();

    let events = log.events();
    assert!(matches!(&events[0], RetryEvent::Retrying { attempt: 1, .. }));
    assert!(events.iter().all(|e| e.operation() == "issued_credentials"));
}
