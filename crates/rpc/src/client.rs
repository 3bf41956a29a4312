//! [`LedgerClient`] over HTTP JSON-RPC 2.0.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use skillpass_core::{Address, ObjectId};
use skillpass_ports::{
    EventQuery, LedgerClient, LedgerError, LedgerEvent, MoveCall, ObjectPage, RawObject, TxReceipt,
};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::wire::{EventData, ObjectResponse, Page, Request, Response};

/// Connection settings for [`RpcLedgerClient`].
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Full-node JSON-RPC endpoint.
    pub endpoint: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Objects or events requested per page.
    pub page_size: usize,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl RpcConfig {
    /// Settings for `endpoint` with a 30 s timeout and 50 objects per page.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(30),
            page_size: 50,
            user_agent: concat!("skillpass/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Read-only ledger client talking to a full node.
///
/// Submitting transactions needs a wallet signer, which lives outside this
/// system; [`execute`](LedgerClient::execute) always returns
/// [`LedgerError::Unsupported`].
#[derive(Debug)]
pub struct RpcLedgerClient {
    http: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Internal`] if the TLS backend cannot be initialised.
    pub fn new(config: RpcConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LedgerError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint requests go to.
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let request = Request {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "rpc request");

        let response = self
            .http
            .post(self.config.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(method, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(method, %status, "rpc http error");
            return Err(LedgerError::Connection(format!("{method}: HTTP {status}")));
        }

        let body: Response<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Serialization(format!("{method}: {e}")))?;

        match (body.result, body.error) {
            (_, Some(error)) => {
                warn!(method, code = error.code, message = %error.message, "rpc error");
                Err(LedgerError::Internal(format!(
                    "{method} failed ({}): {}",
                    error.code, error.message
                )))
            }
            (Some(result), None) => Ok(result),
            (None, None) => Err(LedgerError::Serialization(format!(
                "{method}: response has neither result nor error"
            ))),
        }
    }

    fn transport_error(&self, method: &str, error: &reqwest::Error) -> LedgerError {
        if error.is_timeout() {
            LedgerError::timeout(method, self.config.timeout)
        } else {
            LedgerError::Connection(format!("{method}: {error}"))
        }
    }
}

fn cursor_string(cursor: Option<Value>) -> Option<String> {
    match cursor? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    async fn owned_objects(
        &self,
        owner: &Address,
        struct_type: &str,
        cursor: Option<&str>,
    ) -> Result<ObjectPage, LedgerError> {
        let params = json!([
            owner.as_str(),
            {
                "filter": { "StructType": struct_type },
                "options": { "showContent": true, "showType": true },
            },
            cursor,
            self.config.page_size,
        ]);
        let page: Page<ObjectResponse> = self.call("suix_getOwnedObjects", params).await?;

        Ok(ObjectPage {
            data: page
                .data
                .into_iter()
                .filter_map(|item| item.data)
                .map(RawObject::from)
                .collect(),
            next_cursor: cursor_string(page.next_cursor),
            has_next_page: page.has_next_page,
        })
    }

    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    async fn object(&self, id: &ObjectId) -> Result<Option<RawObject>, LedgerError> {
        let params = json!([id.as_str(), { "showContent": true, "showType": true }]);
        let response: ObjectResponse = self.call("sui_getObject", params).await?;

        if let Some(error) = &response.error {
            debug!(%error, "object lookup returned an error object");
        }
        Ok(response.data.map(RawObject::from))
    }

    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    async fn query_events(&self, query: &EventQuery) -> Result<Vec<LedgerEvent>, LedgerError> {
        // The node filters by one criterion; the sender is matched here, so
        // pages are followed until `limit` matching events are collected.
        let page_size = query.limit.min(self.config.page_size).max(1);
        let mut events = Vec::new();
        let mut cursor = Value::Null;

        loop {
            let params = json!([
                { "MoveEventType": query.event_type },
                cursor,
                page_size,
                true,
            ]);
            let page: Page<EventData> = self.call("suix_queryEvents", params).await?;
            let fetched = page.data.len();

            events.extend(
                page.data
                    .into_iter()
                    .map(LedgerEvent::from)
                    .filter(|event| query.sender.is_none() || event.sender == query.sender),
            );
            if events.len() >= query.limit {
                events.truncate(query.limit);
                break;
            }

            match page.next_cursor {
                Some(next) if page.has_next_page && !next.is_null() => {
                    if next == cursor {
                        warn!(cursor = %next, "node repeated the event cursor, stopping");
                        break;
                    }
                    debug!(fetched, matched = events.len(), "following event cursor");
                    cursor = next;
                }
                _ => break,
            }
        }

        Ok(events)
    }

    async fn execute(&self, call: MoveCall) -> Result<TxReceipt, LedgerError> {
        Err(LedgerError::Unsupported(format!(
            "{} needs a wallet signer",
            call.target()
        )))
    }
}
