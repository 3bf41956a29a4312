//! `{data, loading, error}` query state for presentation layers.
//!
//! A [`Query`] owns a fetcher and publishes its [`QueryState`] through a
//! `tokio::sync::watch` channel. A failed refetch records the error and keeps
//! the previous data; a successful one replaces the data in one step.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CredentialResult;

/// Snapshot of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState<T> {
    /// Result of the last successful fetch.
    pub data: Option<T>,
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, CredentialResult<T>> + Send + Sync>;

/// A re-runnable fetch with observable state.
pub struct Query<T> {
    name: String,
    fetcher: Fetcher<T>,
    state: watch::Sender<QueryState<T>>,
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Query over `fetcher`. Nothing runs until [`refetch`](Self::refetch).
    pub fn new<F, Fut>(name: impl Into<String>, fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CredentialResult<T>> + Send + 'static,
    {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            name: name.into(),
            fetcher: Arc::new(move || fetcher().boxed()),
            state,
        }
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    /// Runs the fetcher and publishes the outcome.
    ///
    /// # Errors
    ///
    /// Whatever the fetcher returned; the error is also recorded in the
    /// state.
    pub async fn refetch(&self) -> CredentialResult<T> {
        self.state.send_modify(|s| s.loading = true);
        debug!(query = %self.name, "refetch started");

        let result = (self.fetcher)().await;

        self.state.send_modify(|s| {
            s.loading = false;
            match &result {
                Ok(data) => {
                    s.data = Some(data.clone());
                    s.error = None;
                }
                Err(e) => s.error = Some(e.to_string()),
            }
        });
        debug!(query = %self.name, ok = result.is_ok(), "refetch finished");
        result
    }
}
