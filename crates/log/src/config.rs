//! Logger configuration and presets

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Primary filter variable, checked before `RUST_LOG`.
pub const LEVEL_ENV: &str = "SKILLPASS_LOG";
/// Output format variable.
pub const FORMAT_ENV: &str = "SKILLPASS_LOG_FORMAT";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Multi-line, human-oriented.
    Pretty,
    /// Single-line.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LogError::Format(other.to_string())),
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `EnvFilter` directive, e.g. `info,skillpass_credential=debug`.
    pub level: String,
    /// Output format.
    pub format: Format,
    /// ANSI colours.
    pub colors: bool,
    /// Include the event target.
    pub target: bool,
    /// Include file and line.
    pub source: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            colors: true,
            target: true,
            source: false,
        }
    }
}

impl Config {
    /// Configuration from the process environment.
    ///
    /// `SKILLPASS_LOG` (falling back to `RUST_LOG`) sets the filter and
    /// `SKILLPASS_LOG_FORMAT` the format. An unknown format keeps the
    /// default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(level) = lookup(LEVEL_ENV).or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }
        if let Some(format) = lookup(FORMAT_ENV).and_then(|f| f.parse().ok()) {
            config.format = format;
        }
        if config.format == Format::Json {
            config.colors = false;
        }
        config
    }

    /// Debug level, pretty output with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            colors: true,
            source: true,
            ..Self::default()
        }
    }

    /// Info level, JSON output, no colours.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            colors: false,
            source: false,
            ..Self::default()
        }
    }

    /// Overrides the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn primary_variable_wins_over_rust_log() {
        let config = Config::from_lookup(lookup(&[
            ("SKILLPASS_LOG", "debug"),
            ("RUST_LOG", "warn"),
        ]));
        assert_eq!(config.level, "debug");

        let config = Config::from_lookup(lookup(&[("RUST_LOG", "warn")]));
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn json_format_disables_colors() {
        let config = Config::from_lookup(lookup(&[("SKILLPASS_LOG_FORMAT", "JSON")]));
        assert_eq!(config.format, Format::Json);
        assert!(!config.colors);
    }

    #[test]
    fn unknown_format_keeps_default() {
        let config = Config::from_lookup(lookup(&[("SKILLPASS_LOG_FORMAT", "logfmt")]));
        assert_eq!(config.format, Format::Compact);
        assert!("logfmt".parse::<Format>().is_err());
    }

    #[test]
    fn presets() {
        assert_eq!(Config::development().format, Format::Pretty);
        assert_eq!(Config::production().format, Format::Json);
        assert_eq!(Config::production().level, "info");
    }
}
