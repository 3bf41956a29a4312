//! Shared fixtures for credential integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use skillpass_core::{Address, ContractConfig, ObjectId};
use skillpass_ports::memory::InMemoryLedger;
use skillpass_ports::{LedgerEvent, RawObject};
use skillpass_resilience::RetryPolicy;

pub const ADMIN: &str = "0xadmin";
pub const UNIVERSITY: &str = "0xuniversity";
pub const STUDENT: &str = "0xstudent";

pub fn config() -> Arc<ContractConfig> {
    Arc::new(ContractConfig {
        package_id: ObjectId::new("0xpackage"),
        registry_id: ObjectId::new("0xregistry"),
        admin_address: Address::new(ADMIN),
        authorized_universities: vec![Address::new(UNIVERSITY)],
        ..ContractConfig::default()
    })
}

/// Fast policy for tests that do not run on paused time.
pub fn quick_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

pub fn ledger() -> Arc<InMemoryLedger> {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.set_signer(Address::new(UNIVERSITY));
    ledger
}

pub fn certificate(config: &ContractConfig, id: &str, fields: Value) -> RawObject {
    let Value::Object(mut map) = fields else {
        panic!("fields must be a JSON object");
    };
    map.entry("university").or_insert_with(|| json!(UNIVERSITY));
    map.entry("student_address").or_insert_with(|| json!(STUDENT));
    map.entry("issue_date").or_insert_with(|| json!("1718000000000"));
    RawObject::with_fields(ObjectId::new(id), config.struct_type(), map)
}

pub fn plain_fields(credential_type: &str, is_valid: bool) -> Value {
    json!({
        "credential_type": credential_type.as_bytes(),
        "grade": [],
        "is_valid": is_valid,
    })
}

/// Stores a plain certificate owned by `owner` and its mint event.
pub fn seed_issued(
    ledger: &InMemoryLedger,
    config: &ContractConfig,
    owner: &str,
    id: &str,
    credential_type: &str,
) {
    ledger.insert_object(
        Some(Address::new(owner)),
        certificate(config, id, plain_fields(credential_type, true)),
    );
    ledger.push_event(LedgerEvent {
        event_type: config.issued_event_type(),
        sender: Some(Address::new(UNIVERSITY)),
        parsed: json!({
            "certificate_id": id,
            "student_address": owner,
            "university": UNIVERSITY,
        }),
        timestamp_ms: None,
    });
}
