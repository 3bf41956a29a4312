//! Credential repository
//!
//! Two read paths with the same shape:
//!
//! - **owned**: every credential object held by an address, page by page
//! - **issued**: mint events filtered to one issuer, then one lookup per
//!   referenced id, sequentially
//!
//! Each path is retried as a whole. A failed lookup of a single id on the
//! issued path is logged and omitted; it does not fail the batch and is not
//! retried on its own.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use skillpass_core::{Address, ContractConfig, ObjectId};
use skillpass_ports::{EventQuery, LedgerClient, LedgerError, LedgerEvent};
use skillpass_resilience::RetryPolicy;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::decoder;
use crate::error::CredentialResult;
use crate::model::NormalizedCredential;

/// Event payload keys that may hold the issuing address.
const ISSUER_KEYS: &[&str] = &["university", "issuer"];
/// Event payload keys that may hold the credential id.
const ID_KEYS: &[&str] = &["certificate_id", "credential_id", "id"];

/// Reads credential objects from the ledger.
#[derive(Clone)]
pub struct CredentialRepository {
    ledger: Arc<dyn LedgerClient>,
    config: Arc<ContractConfig>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CredentialRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRepository")
            .field("struct_type", &self.config.struct_type())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl CredentialRepository {
    /// Repository with the retry policy from `config.retry`.
    pub fn new(ledger: Arc<dyn LedgerClient>, config: Arc<ContractConfig>) -> Self {
        let retry = RetryPolicy::from_settings(&config.retry);
        Self {
            ledger,
            config,
            retry,
        }
    }

    /// Replaces the retry policy, e.g. to attach observers.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Credentials owned by `owner`.
    ///
    /// An empty address yields an empty list without touching the ledger.
    ///
    /// # Errors
    ///
    /// [`CredentialError::Fetch`](crate::CredentialError::Fetch) once every
    /// attempt failed, [`CredentialError::Cancelled`](crate::CredentialError::Cancelled)
    /// if `cancel` fires first.
    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn owned_credentials(
        &self,
        owner: &Address,
        cancel: &CancellationToken,
    ) -> CredentialResult<Vec<NormalizedCredential>> {
        if owner.is_empty() {
            debug!("no owner address, skipping owned-object query");
            return Ok(Vec::new());
        }

        let struct_type = self.config.struct_type();
        let credentials = self
            .retry
            .execute("owned_credentials", cancel, || {
                self.fetch_owned(owner, &struct_type)
            })
            .await?;

        info!(count = credentials.len(), "fetched owned credentials");
        Ok(credentials)
    }

    /// Credentials issued by `issuer`, newest first.
    ///
    /// # Errors
    ///
    /// As for [`owned_credentials`](Self::owned_credentials). Individual
    /// lookup failures are not errors.
    #[instrument(skip_all, fields(issuer = %issuer))]
    pub async fn issued_credentials(
        &self,
        issuer: &Address,
        cancel: &CancellationToken,
    ) -> CredentialResult<Vec<NormalizedCredential>> {
        if issuer.is_empty() {
            debug!("no issuer address, skipping event query");
            return Ok(Vec::new());
        }

        let credentials = self
            .retry
            .execute("issued_credentials", cancel, || self.fetch_issued(issuer))
            .await?;

        info!(count = credentials.len(), "fetched issued credentials");
        Ok(credentials)
    }

    async fn fetch_owned(
        &self,
        owner: &Address,
        struct_type: &str,
    ) -> Result<Vec<NormalizedCredential>, LedgerError> {
        let mut credentials = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .ledger
                .owned_objects(owner, struct_type, cursor.as_deref())
                .await?;
            debug!(
                objects = page.data.len(),
                has_next_page = page.has_next_page,
                "owned-object page"
            );

            for object in &page.data {
                match decoder::decode(object) {
                    Some(credential) => credentials.push(credential),
                    None => debug!(object_id = %object.object_id, "object has no fields, skipped"),
                }
            }

            match page.next_cursor {
                Some(next) if page.has_next_page => {
                    if cursor.as_deref() == Some(next.as_str()) {
                        warn!(cursor = %next, "node repeated the page cursor, stopping");
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(credentials)
    }

    async fn fetch_issued(
        &self,
        issuer: &Address,
    ) -> Result<Vec<NormalizedCredential>, LedgerError> {
        let query = EventQuery {
            event_type: self.config.issued_event_type(),
            sender: Some(issuer.clone()),
            limit: self.config.event_query_limit,
        };
        let events = self.ledger.query_events(&query).await?;
        let ids = issued_ids(&events, issuer);
        debug!(events = events.len(), ids = ids.len(), "mint events matched");

        let mut credentials = Vec::with_capacity(ids.len());
        for id in ids {
            match self.ledger.object(&id).await {
                Ok(Some(object)) => match decoder::decode(&object) {
                    Some(credential) => credentials.push(credential),
                    None => warn!(object_id = %id, "issued object has no fields, omitted"),
                },
                Ok(None) => warn!(object_id = %id, "issued object not found, omitted"),
                Err(error) => {
                    warn!(object_id = %id, error = %error, "issued object lookup failed, omitted");
                }
            }
        }

        Ok(credentials)
    }
}

/// Credential ids referenced by mint events from `issuer`, first occurrence
/// kept, event order preserved.
///
/// The issuer is read from the event payload; events whose payload names no
/// issuer are matched on the transaction sender instead.
pub fn issued_ids(events: &[LedgerEvent], issuer: &Address) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|event| event_issuer(event).as_ref() == Some(issuer))
        .filter_map(|event| payload_str(&event.parsed, ID_KEYS).map(ObjectId::new))
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

fn event_issuer(event: &LedgerEvent) -> Option<Address> {
    payload_str(&event.parsed, ISSUER_KEYS)
        .map(Address::new)
        .or_else(|| event.sender.clone())
}

fn payload_str<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| match payload.get(*key)? {
        Value::String(s) => Some(s.as_str()),
        // UID rendering: {"id": "0x..."}
        Value::Object(uid) => uid.get("id").and_then(Value::as_str),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use skillpass_ports::{MoveCall, ObjectPage, RawObject, TxReceipt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(parsed: Value, sender: Option<&str>) -> LedgerEvent {
        LedgerEvent {
            event_type: "0xp::certificate_registry::CertificateMinted".into(),
            sender: sender.map(Address::new),
            parsed,
            timestamp_ms: None,
        }
    }

    #[test]
    fn issued_ids_filter_by_issuer_and_dedupe() {
        let uni = Address::new("0xuni");
        let events = vec![
            event(json!({ "certificate_id": "0x3", "university": "0xUNI" }), None),
            event(json!({ "certificate_id": "0x2", "university": "0xother" }), None),
            event(json!({ "credential_id": { "id": "0x1" }, "issuer": "0xuni" }), None),
            event(json!({ "certificate_id": "0x3", "university": "0xuni" }), None),
        ];

        assert_eq!(
            issued_ids(&events, &uni),
            vec![ObjectId::new("0x3"), ObjectId::new("0x1")]
        );
    }

    #[test]
    fn sender_is_used_when_payload_has_no_issuer() {
        let uni = Address::new("0xuni");
        let events = vec![
            event(json!({ "id": "0x9" }), Some("0xuni")),
            event(json!({ "id": "0x8" }), Some("0xsomeone")),
            event(json!({ "note": "no id" }), Some("0xuni")),
        ];

        assert_eq!(issued_ids(&events, &uni), vec![ObjectId::new("0x9")]);
    }

    /// Node that always claims another page behind the same cursor.
    #[derive(Default)]
    struct StuckCursorLedger {
        pages: AtomicUsize,
    }

    #[async_trait]
    impl LedgerClient for StuckCursorLedger {
        async fn owned_objects(
            &self,
            _owner: &Address,
            _struct_type: &str,
            _cursor: Option<&str>,
        ) -> Result<ObjectPage, LedgerError> {
            self.pages.fetch_add(1, Ordering::SeqCst);
            let mut fields = serde_json::Map::new();
            fields.insert("is_valid".into(), json!(true));
            Ok(ObjectPage {
                data: vec![RawObject {
                    object_id: ObjectId::new("0x1"),
                    type_tag: None,
                    fields: Some(fields),
                }],
                next_cursor: Some("0x1".into()),
                has_next_page: true,
            })
        }

        async fn object(&self, _id: &ObjectId) -> Result<Option<RawObject>, LedgerError> {
            Ok(None)
        }

        async fn query_events(&self, _query: &EventQuery) -> Result<Vec<LedgerEvent>, LedgerError> {
            Ok(Vec::new())
        }

        async fn execute(&self, call: MoveCall) -> Result<TxReceipt, LedgerError> {
            Err(LedgerError::Unsupported(call.target()))
        }
    }

    #[tokio::test]
    async fn repeated_cursor_ends_owned_pagination() {
        let ledger = Arc::new(StuckCursorLedger::default());
        let repo = CredentialRepository::new(ledger.clone(), Arc::new(ContractConfig::default()));

        let credentials = repo
            .owned_credentials(&Address::new("0xa"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(ledger.pages.load(Ordering::SeqCst), 2);
        assert_eq!(credentials.len(), 2);
    }
}
