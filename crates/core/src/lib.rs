//! # Skillpass Core
//!
//! Handles and configuration shared by every skillpass crate.
//!
//! - [`Address`] and [`ObjectId`]: opaque, normalised ledger handles
//! - [`ContractConfig`]: static identifiers of the deployed credential
//!   contract, loaded once and passed explicitly to each component

pub mod config;
pub mod id;

pub use config::{ConfigError, ConfigResult, ContractConfig, DEFAULT_NETWORK, RetrySettings};
pub use id::{Address, ObjectId};
