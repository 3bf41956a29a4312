#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skillpass Resilience
//!
//! Retry for idempotent ledger reads.
//!
//! [`RetryPolicy`] runs an operation up to four times by default, waiting
//! `attempt * base_delay` between attempts. The wait never blocks other
//! tasks and both the wait and the attempt itself race against a
//! [`CancellationToken`].
//!
//! ```no_run
//! use skillpass_resilience::{CancellationToken, RetryPolicy};
//!
//! # async fn demo() {
//! let policy = RetryPolicy::default();
//! let cancel = CancellationToken::new();
//! let value = policy
//!     .execute("fetch_balance", &cancel, || async { Ok::<_, String>(42) })
//!     .await;
//! assert_eq!(value.ok(), Some(42));
//! # }
//! ```

pub mod error;
pub mod observer;
pub mod retry;

pub use error::RetryError;
pub use observer::{EventLog, RetryEvent, RetryObserver};
pub use retry::{LinearBackoff, RetryPolicy, RetryStats};
pub use tokio_util::sync::CancellationToken;
