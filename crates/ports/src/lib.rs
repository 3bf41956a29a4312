#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skillpass Ports
//!
//! The ledger-client interface (port) that drivers implement and the
//! credential layer consumes:
//!
//! - [`LedgerClient`]: owned-object query, object lookup, event query,
//!   transaction submission
//! - [`LedgerError`]: driver-independent failure taxonomy
//!
//! With the `test-util` feature, [`memory::InMemoryLedger`] provides a
//! process-local ledger with failure injection.

pub mod error;
pub mod ledger;
#[cfg(feature = "test-util")]
pub mod memory;

pub use error::LedgerError;
pub use ledger::{
    CallArg, EventQuery, LedgerClient, LedgerEvent, MoveCall, ObjectPage, RawObject, TxReceipt,
};
