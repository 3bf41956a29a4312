//! Ledger client port.
//!
//! The ledger itself (object storage, consensus, transaction execution) is an
//! external collaborator. This module fixes the shape of the four calls the
//! credential layer makes against it, and the raw data that comes back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skillpass_core::{Address, ObjectId};

use crate::error::LedgerError;

/// An object as returned by the ledger, before any decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObject {
    /// Ledger-assigned identifier.
    pub object_id: ObjectId,
    /// Move type of the object, when the node reports it.
    pub type_tag: Option<String>,
    /// Struct fields as the node renders them. `None` for objects without
    /// Move content (packages, for instance).
    pub fields: Option<Map<String, Value>>,
}

impl RawObject {
    /// Creates an object with content fields.
    pub fn with_fields(object_id: ObjectId, type_tag: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            object_id,
            type_tag: Some(type_tag.into()),
            fields: Some(fields),
        }
    }
}

/// One page of an owned-objects query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPage {
    /// Objects on this page.
    pub data: Vec<RawObject>,
    /// Cursor to pass for the next page.
    pub next_cursor: Option<String>,
    /// Whether another page exists.
    pub has_next_page: bool,
}

/// Filter for an event query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Fully-qualified event type.
    pub event_type: String,
    /// Only events from transactions sent by this address, if set.
    pub sender: Option<Address>,
    /// Maximum number of events, newest first.
    pub limit: usize,
}

/// An event from the ledger's append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Fully-qualified event type.
    pub event_type: String,
    /// Sender of the emitting transaction.
    pub sender: Option<Address>,
    /// Event payload as rendered by the node.
    pub parsed: Value,
    /// Milliseconds since the Unix epoch, if reported.
    pub timestamp_ms: Option<u64>,
}

/// A positional argument of a contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    /// Reference to an existing object.
    Object(ObjectId),
    /// Pure address.
    Address(Address),
    /// Pure `vector<u8>`.
    Bytes(Vec<u8>),
    /// Pure `Option<vector<u8>>`.
    OptionalBytes(Option<Vec<u8>>),
    /// Pure UTF-8 string.
    Text(String),
}

/// A single ledger-mutating contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    /// Package holding the module.
    pub package: ObjectId,
    /// Module name.
    pub module: String,
    /// Entry function name.
    pub function: String,
    /// Positional arguments in the order the entry function declares them.
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    /// `<package>::<module>::<function>`.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction digest.
    pub digest: String,
}

/// Interface to the ledger.
///
/// All methods are async and object-safe, so the client can be shared as
/// `Arc<dyn LedgerClient>` across every component.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Objects of `struct_type` owned by `owner`, one page at a time.
    async fn owned_objects(
        &self,
        owner: &Address,
        struct_type: &str,
        cursor: Option<&str>,
    ) -> Result<ObjectPage, LedgerError>;

    /// A single object by id. `Ok(None)` when it does not exist.
    async fn object(&self, id: &ObjectId) -> Result<Option<RawObject>, LedgerError>;

    /// Events matching `query`, newest first.
    async fn query_events(&self, query: &EventQuery) -> Result<Vec<LedgerEvent>, LedgerError>;

    /// Signs and submits `call`.
    async fn execute(&self, call: MoveCall) -> Result<TxReceipt, LedgerError>;
}
