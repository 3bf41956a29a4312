//! In-memory ledger for tests.
//!
//! Stores objects and events in process, applies the effects of the
//! credential contract's entry functions well enough for end-to-end tests
//! (mint creates an object and an event, revoke flips the validity flag),
//! and supports failure injection per operation or per object.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use skillpass_core::{Address, ObjectId};

use crate::error::LedgerError;
use crate::ledger::{
    CallArg, EventQuery, LedgerClient, LedgerEvent, MoveCall, ObjectPage, RawObject, TxReceipt,
};

/// Name of the credential struct the simulated contract mints.
pub const CERTIFICATE_STRUCT: &str = "Certificate";
/// Name of the event the simulated contract emits on mint.
pub const MINTED_EVENT: &str = "CertificateMinted";

/// Ledger operations, for failure injection and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    /// [`LedgerClient::owned_objects`]
    OwnedObjects,
    /// [`LedgerClient::object`]
    Object,
    /// [`LedgerClient::query_events`]
    QueryEvents,
    /// [`LedgerClient::execute`]
    Execute,
}

#[derive(Debug, Default)]
struct State {
    objects: Vec<(Option<Address>, RawObject)>,
    events: Vec<LedgerEvent>,
    failures: HashMap<LedgerOp, VecDeque<LedgerError>>,
    broken_objects: HashMap<ObjectId, LedgerError>,
    calls: HashMap<LedgerOp, usize>,
    submitted: Vec<MoveCall>,
    next_id: u64,
    signer: Address,
}

/// In-memory [`LedgerClient`].
#[derive(Debug)]
pub struct InMemoryLedger {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// Empty ledger with a page size of 50.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
            page_size: 50,
        }
    }

    /// Sets how many objects an owned-objects page holds.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the address that signs submitted transactions.
    pub fn set_signer(&self, signer: Address) {
        self.state.lock().signer = signer;
    }

    /// Stores an object, optionally owned by `owner`.
    pub fn insert_object(&self, owner: Option<Address>, object: RawObject) {
        let mut state = self.state.lock();
        state.objects.retain(|(_, o)| o.object_id != object.object_id);
        state.objects.push((owner, object));
    }

    /// Appends an event to the log.
    pub fn push_event(&self, event: LedgerEvent) {
        self.state.lock().events.push(event);
    }

    /// Makes the next call of `op` fail with `error`. Calls queue up.
    pub fn fail_next(&self, op: LedgerOp, error: LedgerError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Makes the next `times` calls of `op` fail with `error`.
    pub fn fail_times(&self, op: LedgerOp, times: usize, error: LedgerError) {
        for _ in 0..times {
            self.fail_next(op, error.clone());
        }
    }

    /// Makes every lookup of `id` fail with `error`.
    pub fn break_object(&self, id: ObjectId, error: LedgerError) {
        self.state.lock().broken_objects.insert(id, error);
    }

    /// How many times `op` was called, failed calls included.
    pub fn calls(&self, op: LedgerOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Every call that reached [`LedgerClient::execute`], rejected ones included.
    pub fn submitted(&self) -> Vec<MoveCall> {
        self.state.lock().submitted.clone()
    }

    /// Current state of an object.
    pub fn get(&self, id: &ObjectId) -> Option<RawObject> {
        self.state
            .lock()
            .objects
            .iter()
            .find(|(_, o)| &o.object_id == id)
            .map(|(_, o)| o.clone())
    }

    fn enter(&self, op: LedgerOp) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        *state.calls.entry(op).or_default() += 1;
        match state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

fn bytes_json(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|b| json!(b)).collect())
}

fn option_json(bytes: Option<&Vec<u8>>) -> Value {
    match bytes {
        Some(bytes) => json!([bytes_json(bytes)]),
        None => json!([]),
    }
}

impl State {
    fn fresh_id(&mut self) -> ObjectId {
        let id = ObjectId::new(format!("0x{:064x}", self.next_id));
        self.next_id += 1;
        id
    }

    fn apply(&mut self, call: &MoveCall) -> Result<(), LedgerError> {
        match call.function.as_str() {
            "mint_certificate" => self.mint(call, false),
            "mint_encrypted_certificate" => self.mint(call, true),
            "revoke_certificate" => self.revoke(call),
            // Registry membership lives on the ledger; nothing to simulate.
            "add_university" | "remove_university" => Ok(()),
            other => Err(LedgerError::rejected(format!(
                "function {other} not found in module {}",
                call.module
            ))),
        }
    }

    fn mint(&mut self, call: &MoveCall, encrypted: bool) -> Result<(), LedgerError> {
        let student = match call.arguments.get(1) {
            Some(CallArg::Address(a)) => a.clone(),
            _ => return Err(LedgerError::rejected("argument 1: expected address")),
        };
        let bytes_at = |i: usize| match call.arguments.get(i) {
            Some(CallArg::Bytes(b)) => Ok(b.clone()),
            _ => Err(LedgerError::rejected(format!("argument {i}: expected vector<u8>"))),
        };
        let option_at = |i: usize| match call.arguments.get(i) {
            Some(CallArg::OptionalBytes(b)) => Ok(b.clone()),
            _ => Err(LedgerError::rejected(format!(
                "argument {i}: expected Option<vector<u8>>"
            ))),
        };

        let mut fields = Map::new();
        fields.insert("student_address".into(), json!(student.as_str()));
        fields.insert("university".into(), json!(self.signer.as_str()));
        if encrypted {
            let policy = match call.arguments.get(6) {
                Some(CallArg::Text(s)) => s.clone(),
                _ => return Err(LedgerError::rejected("argument 6: expected string")),
            };
            fields.insert("encrypted_credential_type".into(), bytes_json(&bytes_at(2)?));
            fields.insert("encrypted_grade".into(), option_json(option_at(3)?.as_ref()));
            fields.insert("encryption_params".into(), bytes_json(&bytes_at(4)?));
            fields.insert("public_key_hash".into(), bytes_json(&bytes_at(5)?));
            fields.insert("access_policy".into(), json!(policy));
        } else {
            fields.insert("credential_type".into(), bytes_json(&bytes_at(2)?));
            fields.insert("grade".into(), option_json(option_at(3)?.as_ref()));
        }
        fields.insert("issue_date".into(), json!(now_ms().to_string()));
        fields.insert("walrus_evidence_blob".into(), json!([]));
        fields.insert("is_valid".into(), json!(true));

        let id = self.fresh_id();
        fields.insert("id".into(), json!({ "id": id.as_str() }));
        let type_tag = format!("{}::{}::{CERTIFICATE_STRUCT}", call.package, call.module);
        self.objects.push((
            Some(student.clone()),
            RawObject::with_fields(id.clone(), type_tag, fields),
        ));
        self.events.push(LedgerEvent {
            event_type: format!("{}::{}::{MINTED_EVENT}", call.package, call.module),
            sender: Some(self.signer.clone()),
            parsed: json!({
                "certificate_id": id.as_str(),
                "student_address": student.as_str(),
                "university": self.signer.as_str(),
            }),
            timestamp_ms: Some(now_ms()),
        });
        Ok(())
    }

    fn revoke(&mut self, call: &MoveCall) -> Result<(), LedgerError> {
        let id = match call.arguments.first() {
            Some(CallArg::Object(id)) => id.clone(),
            _ => return Err(LedgerError::rejected("argument 0: expected object")),
        };
        let (_, object) = self
            .objects
            .iter_mut()
            .find(|(_, o)| o.object_id == id)
            .ok_or_else(|| LedgerError::not_found("Certificate", id.as_str()))?;
        let fields = object
            .fields
            .as_mut()
            .ok_or_else(|| LedgerError::rejected("object has no fields"))?;
        if fields.get("is_valid") == Some(&Value::Bool(false)) {
            return Err(LedgerError::rejected("ECertificateAlreadyRevoked"));
        }
        fields.insert("is_valid".into(), Value::Bool(false));
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn owned_objects(
        &self,
        owner: &Address,
        struct_type: &str,
        cursor: Option<&str>,
    ) -> Result<ObjectPage, LedgerError> {
        self.enter(LedgerOp::OwnedObjects)?;
        let state = self.state.lock();
        let matching: Vec<&RawObject> = state
            .objects
            .iter()
            .filter(|(o, obj)| {
                o.as_ref() == Some(owner) && obj.type_tag.as_deref() == Some(struct_type)
            })
            .map(|(_, obj)| obj)
            .collect();

        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| LedgerError::Serialization(format!("bad cursor: {c}")))?,
            None => 0,
        };
        let end = (start + self.page_size).min(matching.len());
        let data = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|o| (*o).clone())
            .collect();
        let has_next_page = end < matching.len();
        Ok(ObjectPage {
            data,
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn object(&self, id: &ObjectId) -> Result<Option<RawObject>, LedgerError> {
        self.enter(LedgerOp::Object)?;
        if let Some(error) = self.state.lock().broken_objects.get(id) {
            return Err(error.clone());
        }
        Ok(self.get(id))
    }

    async fn query_events(&self, query: &EventQuery) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.enter(LedgerOp::QueryEvents)?;
        let state = self.state.lock();
        Ok(state
            .events
            .iter()
            .rev()
            .filter(|e| e.event_type == query.event_type)
            .filter(|e| query.sender.is_none() || e.sender == query.sender)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn execute(&self, call: MoveCall) -> Result<TxReceipt, LedgerError> {
        let mut state = self.state.lock();
        *state.calls.entry(LedgerOp::Execute).or_default() += 1;
        state.submitted.push(call.clone());
        if let Some(error) = state
            .failures
            .get_mut(&LedgerOp::Execute)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        state.apply(&call)?;
        let digest = format!("tx{:08}", state.submitted.len());
        tracing::debug!(call = %call.target(), %digest, "in-memory transaction applied");
        Ok(TxReceipt { digest })
    }
}
