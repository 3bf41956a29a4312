//! Field decoder
//!
//! Turns a raw ledger object into a [`NormalizedCredential`]. Decoding is
//! total: malformed input degrades to a fallback string and never fails.
//!
//! Per display field, the precedence is:
//!
//! 1. a non-empty encrypted payload yields [`ENCRYPTED_MARKER`]
//! 2. a byte vector is decoded as UTF-8, falling back to `0x`-prefixed hex
//! 3. a string is used as-is
//! 4. otherwise the field's fallback ([`UNKNOWN_CREDENTIAL`] or
//!    [`GRADE_NOT_SPECIFIED`])

use serde_json::{Map, Value};
use skillpass_core::{Address, ObjectId};
use skillpass_ports::RawObject;

use crate::model::{CredentialRecord, NormalizedCredential, RawField};

/// Shown in place of an encrypted value.
pub const ENCRYPTED_MARKER: &str = "[ENCRYPTED]";
/// Fallback for a missing credential type.
pub const UNKNOWN_CREDENTIAL: &str = "Unknown Credential";
/// Fallback for a missing grade.
pub const GRADE_NOT_SPECIFIED: &str = "Not specified";

/// Classifies a plain field.
///
/// - `null`, missing, `""` and `[]` are [`RawField::Absent`]
/// - a string is [`RawField::Text`]
/// - an array of integers in `0..=255` is [`RawField::Bytes`]
/// - a one-element array around an array or string (an `Option` as nodes
///   render it) and `{"vec": [...]}` are unwrapped
/// - anything else is absent
pub fn classify(value: Option<&Value>) -> RawField {
    match value {
        None | Some(Value::Null) => RawField::Absent,
        Some(Value::String(s)) if s.is_empty() => RawField::Absent,
        Some(Value::String(s)) => RawField::Text(s.clone()),
        Some(Value::Array(items)) => classify_array(items),
        Some(Value::Object(map)) => match map.get("vec") {
            Some(inner) => classify(Some(inner)),
            None => RawField::Absent,
        },
        Some(Value::Bool(_) | Value::Number(_)) => RawField::Absent,
    }
}

fn classify_array(items: &[Value]) -> RawField {
    if items.is_empty() {
        return RawField::Absent;
    }
    let bytes: Option<Vec<u8>> = items
        .iter()
        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect();
    if let Some(bytes) = bytes {
        return RawField::Bytes(bytes);
    }
    match items {
        [inner @ (Value::Array(_) | Value::String(_) | Value::Object(_))] => classify(Some(inner)),
        _ => RawField::Absent,
    }
}

/// Classifies an encrypted-payload field. Any non-empty payload becomes
/// [`RawField::Encrypted`].
pub fn classify_encrypted(value: Option<&Value>) -> RawField {
    match classify(value) {
        RawField::Bytes(bytes) | RawField::Encrypted(bytes) => RawField::Encrypted(bytes),
        RawField::Text(text) => RawField::Encrypted(text.into_bytes()),
        RawField::Absent => RawField::Absent,
    }
}

/// Decodes bytes as UTF-8, or renders them as `0x`-prefixed hex.
pub fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => format!("0x{}", hex::encode(bytes)),
    }
}

/// Resolves one display field.
pub fn resolve(plain: &RawField, encrypted: &RawField, fallback: &str) -> String {
    if !encrypted.is_absent() {
        return ENCRYPTED_MARKER.to_string();
    }
    match plain {
        RawField::Bytes(bytes) => decode_bytes(bytes),
        RawField::Text(text) => text.clone(),
        RawField::Encrypted(_) => ENCRYPTED_MARKER.to_string(),
        RawField::Absent => fallback.to_string(),
    }
}

/// Reads a [`CredentialRecord`] out of a raw object. `None` when the object
/// carries no struct fields.
pub fn decode_record(object: &RawObject) -> Option<CredentialRecord> {
    let fields = object.fields.as_ref()?;
    Some(CredentialRecord {
        id: object_id(object, fields),
        student_address: address(fields, &["student_address", "student"]),
        issuer_address: address(fields, &["university", "issuer"]),
        credential_type: classify(fields.get("credential_type")),
        grade: classify(fields.get("grade")),
        encrypted_credential_type: classify_encrypted(fields.get("encrypted_credential_type")),
        encrypted_grade: classify_encrypted(fields.get("encrypted_grade")),
        encryption_params: classify(fields.get("encryption_params")).into_bytes(),
        public_key_hash: classify(fields.get("public_key_hash")).into_bytes(),
        access_policy: fields
            .get("access_policy")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        issue_date: issue_date(fields.get("issue_date")),
        evidence_blob: classify(
            fields
                .get("walrus_evidence_blob")
                .or_else(|| fields.get("evidence_blob")),
        )
        .into_bytes(),
        is_valid: is_valid(fields.get("is_valid")),
    })
}

/// Resolves a record for display.
pub fn normalize(record: CredentialRecord) -> NormalizedCredential {
    let credential_type = resolve(
        &record.credential_type,
        &record.encrypted_credential_type,
        UNKNOWN_CREDENTIAL,
    );
    let grade = resolve(&record.grade, &record.encrypted_grade, GRADE_NOT_SPECIFIED);
    NormalizedCredential {
        id: record.id,
        student_address: record.student_address,
        issuer_address: record.issuer_address,
        credential_type,
        grade,
        encrypted_credential_type: record.encrypted_credential_type.into_bytes(),
        encrypted_grade: record.encrypted_grade.into_bytes(),
        encryption_params: record.encryption_params,
        public_key_hash: record.public_key_hash,
        access_policy: record.access_policy,
        issue_date: record.issue_date,
        evidence_blob: record.evidence_blob,
        is_valid: record.is_valid,
    }
}

/// [`decode_record`] followed by [`normalize`].
pub fn decode(object: &RawObject) -> Option<NormalizedCredential> {
    decode_record(object).map(normalize)
}

fn object_id(object: &RawObject, fields: &Map<String, Value>) -> ObjectId {
    if !object.object_id.is_empty() {
        return object.object_id.clone();
    }
    // UID renders as {"id": "0x..."} inside the struct.
    match fields.get("id") {
        Some(Value::String(id)) => ObjectId::new(id),
        Some(Value::Object(uid)) => uid
            .get("id")
            .and_then(Value::as_str)
            .map(ObjectId::new)
            .unwrap_or_default(),
        _ => ObjectId::default(),
    }
}

fn address(fields: &Map<String, Value>, keys: &[&str]) -> Address {
    keys.iter()
        .find_map(|k| fields.get(*k).and_then(Value::as_str))
        .map(Address::new)
        .unwrap_or_default()
}

fn issue_date(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn is_valid(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}
