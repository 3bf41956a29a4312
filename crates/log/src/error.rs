//! Logger errors

/// Result alias for logger setup.
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while configuring or installing the logger.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The filter directive did not parse.
    #[error("invalid log filter {directive:?}: {reason}")]
    Filter {
        /// Directive as given.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// Unknown output format name.
    #[error("unknown log format {0:?}, expected pretty, compact or json")]
    Format(String),

    /// A global subscriber is already installed.
    #[error("logger already initialised: {0}")]
    AlreadyInitialized(String),
}
