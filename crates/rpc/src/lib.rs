#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skillpass RPC
//!
//! A [`LedgerClient`](skillpass_ports::LedgerClient) driver for a full node's
//! JSON-RPC interface: owned-object pages, object lookup and event queries.

mod client;
mod wire;

pub use client::{RpcConfig, RpcLedgerClient};
