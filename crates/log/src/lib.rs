#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skillpass Log
//!
//! One-call `tracing` setup for skillpass binaries.
//!
//! ```no_run
//! // SKILLPASS_LOG=debug SKILLPASS_LOG_FORMAT=json
//! skillpass_log::auto_init().expect("logger");
//! tracing::info!("ready");
//! ```

mod builder;
mod config;
mod error;

pub use builder::LoggerBuilder;
pub use config::{Config, FORMAT_ENV, Format, LEVEL_ENV};
pub use error::{LogError, LogResult};

/// Installs the logger configured from the environment.
///
/// # Errors
///
/// See [`LoggerBuilder::init`].
pub fn auto_init() -> LogResult<()> {
    init_with(Config::from_env())
}

/// Installs the logger with `config`.
///
/// # Errors
///
/// See [`LoggerBuilder::init`].
pub fn init_with(config: Config) -> LogResult<()> {
    LoggerBuilder::from_config(config).init()
}
