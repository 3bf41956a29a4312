//! JSON-RPC wire shapes of a full node.
//!
//! Only the fields the driver reads are modelled; everything else the node
//! sends is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skillpass_core::{Address, ObjectId};
use skillpass_ports::{LedgerEvent, RawObject};

#[derive(Debug, Serialize)]
pub(crate) struct Request<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Response<T> {
    pub result: Option<T>,
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorObject {
    pub code: i64,
    pub message: String,
}

/// `sui_getObject` result, also the element of an owned-objects page.
#[derive(Debug, Deserialize)]
pub(crate) struct ObjectResponse {
    pub data: Option<ObjectData>,
    /// Present for missing or deleted objects, e.g. `{"code": "notExists"}`.
    pub error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectData {
    pub object_id: String,
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    pub content: Option<ObjectContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObjectContent {
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    pub fields: Option<Map<String, Value>>,
}

impl From<ObjectData> for RawObject {
    fn from(data: ObjectData) -> Self {
        let (content_type, fields) = match data.content {
            Some(content) => (content.type_tag, content.fields),
            None => (None, None),
        };
        Self {
            object_id: ObjectId::new(data.object_id),
            type_tag: data.type_tag.or(content_type),
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    pub next_cursor: Option<Value>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventData {
    #[serde(rename = "type")]
    pub event_type: String,
    pub sender: Option<String>,
    #[serde(default)]
    pub parsed_json: Value,
    pub timestamp_ms: Option<String>,
}

impl From<EventData> for LedgerEvent {
    fn from(event: EventData) -> Self {
        Self {
            event_type: event.event_type,
            sender: event.sender.map(Address::new),
            parsed: event.parsed_json,
            timestamp_ms: event.timestamp_ms.and_then(|ms| ms.parse().ok()),
        }
    }
}
