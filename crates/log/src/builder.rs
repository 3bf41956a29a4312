//! Subscriber installation

use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::error::{LogError, LogResult};

/// Installs a global subscriber from a [`Config`].
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

impl LoggerBuilder {
    /// Builder from `config`.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parses the filter without installing anything.
    ///
    /// # Errors
    ///
    /// [`LogError::Filter`] if the directive does not parse.
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            directive: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// [`LogError::Filter`] for a bad directive,
    /// [`LogError::AlreadyInitialized`] if a subscriber is already set.
    pub fn init(self) -> LogResult<()> {
        let filter = self.filter()?;
        let config = &self.config;
        let registry = Registry::default().with(filter);

        let installed = match config.format {
            Format::Pretty => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .pretty()
                        .with_ansi(config.colors)
                        .with_target(config.target)
                        .with_file(config.source)
                        .with_line_number(config.source),
                )
                .try_init(),
            Format::Compact => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .compact()
                        .with_ansi(config.colors)
                        .with_target(config.target)
                        .with_file(config.source)
                        .with_line_number(config.source),
                )
                .try_init(),
            Format::Json => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .json()
                        .with_current_span(true)
                        .with_target(config.target)
                        .with_file(config.source)
                        .with_line_number(config.source),
                )
                .try_init(),
        };

        installed.map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;
        tracing::debug!(level = %config.level, format = ?config.format, "logger initialised");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_is_rejected() {
        let builder = LoggerBuilder::from_config(Config::default().with_level("skillpass=loud"));
        assert!(matches!(builder.filter(), Err(LogError::Filter { .. })));
    }
}
