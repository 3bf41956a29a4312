//! Static contract configuration.
//!
//! [`ContractConfig`] is loaded once at start-up (defaults, then an optional
//! TOML file, then `SKILLPASS_*` environment overrides), validated, and then
//! shared read-only with every component. Nothing mutates it afterwards.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::id::{Address, ObjectId};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SKILLPASS_";

/// Full node used when no `network` is configured.
pub const DEFAULT_NETWORK: &str = "https://fullnode.testnet.sui.io:443";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A value is present but unusable.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidValue {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A required value is empty.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// Missing field.
        field: String,
    },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::MissingRequired {
            field: field.to_string(),
        }
    }
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Retry settings for ledger reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay; the n-th retry waits `n * base_delay`.
    pub base_delay_ms: u64,
}

impl RetrySettings {
    /// Base delay as a [`Duration`].
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
        }
    }
}

/// Identifiers and endpoints of the deployed credential contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Package that holds the credential module.
    pub package_id: ObjectId,
    /// Shared registry object passed to mint and registry calls.
    pub registry_id: ObjectId,
    /// Module exposing the credential entry functions.
    pub module_name: String,
    /// Name of the credential struct inside `module_name`.
    pub struct_name: String,
    /// Name of the event emitted on every mint.
    pub issued_event: String,
    /// System clock object passed to mint calls.
    pub clock_object_id: ObjectId,
    /// Full node endpoint; [`DEFAULT_NETWORK`] when unset.
    pub network: Option<Url>,
    /// Canonical administrator.
    pub admin_address: Address,
    /// Further administrators. Every entry has the same rights as
    /// `admin_address`; keep this list empty unless the registry really
    /// has more than one operator.
    pub additional_admins: Vec<Address>,
    /// Static stand-in for the on-chain university registry.
    pub authorized_universities: Vec<Address>,
    /// Maximum number of events fetched per issued-credentials query.
    pub event_query_limit: usize,
    /// Read retry settings.
    pub retry: RetrySettings,
}

impl Default for ContractConfig {
    /// Testnet deployment of the certificate registry.
    fn default() -> Self {
        Self {
            package_id: ObjectId::new(
                "0xf1cb82954194f281b4bcddee3b8922b81322cd742d2ab23d169dfaf11883c736",
            ),
            registry_id: ObjectId::new(
                "0x6c0bab54d2c4ba3caba62063cb7e972370e60deb9dbbe2fd46f825897bde0bdd",
            ),
            module_name: "certificate_registry".to_string(),
            struct_name: "Certificate".to_string(),
            issued_event: "CertificateMinted".to_string(),
            clock_object_id: ObjectId::new("0x6"),
            network: None,
            admin_address: Address::new(
                "0x83b3e15b0f43aacdbd39ede604391ef9720df83b33420fb72deef7f8e795cbe9",
            ),
            additional_admins: Vec::new(),
            authorized_universities: Vec::new(),
            event_query_limit: 100,
            retry: RetrySettings::default(),
        }
    }
}

impl ContractConfig {
    /// Loads configuration: defaults, then `path` if given, then the process
    /// environment. The result is validated.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        tracing::debug!(
            package_id = %config.package_id,
            network = %config.network_url()?,
            "contract configuration loaded"
        );
        Ok(config)
    }

    /// Reads a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `SKILLPASS_*` overrides obtained through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("PACKAGE_ID") {
            self.package_id = ObjectId::new(v);
        }
        if let Some(v) = var("REGISTRY_ID") {
            self.registry_id = ObjectId::new(v);
        }
        if let Some(v) = var("MODULE_NAME") {
            self.module_name = v;
        }
        if let Some(v) = var("NETWORK") {
            self.network = Some(parse_url(&v)?);
        }
        if let Some(v) = var("ADMIN_ADDRESS") {
            self.admin_address = Address::new(v);
        }
        if let Some(v) = var("ADDITIONAL_ADMINS") {
            self.additional_admins = split_addresses(&v);
        }
        if let Some(v) = var("AUTHORIZED_UNIVERSITIES") {
            self.authorized_universities = split_addresses(&v);
        }
        if let Some(v) = var("EVENT_QUERY_LIMIT") {
            self.event_query_limit = parse_number("event_query_limit", &v)?;
        }
        if let Some(v) = var("MAX_RETRIES") {
            self.retry.max_retries = parse_number("retry.max_retries", &v)?;
        }
        if let Some(v) = var("RETRY_BASE_DELAY_MS") {
            self.retry.base_delay_ms = parse_number("retry.base_delay_ms", &v)?;
        }
        Ok(self)
    }

    /// Checks that every identifier is present and limits are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.package_id.is_empty() {
            return Err(ConfigError::missing("package_id"));
        }
        if self.registry_id.is_empty() {
            return Err(ConfigError::missing("registry_id"));
        }
        if self.clock_object_id.is_empty() {
            return Err(ConfigError::missing("clock_object_id"));
        }
        if self.admin_address.is_empty() {
            return Err(ConfigError::missing("admin_address"));
        }
        for (field, value) in [
            ("module_name", &self.module_name),
            ("struct_name", &self.struct_name),
            ("issued_event", &self.issued_event),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::missing(field));
            }
        }
        if self.event_query_limit == 0 {
            return Err(ConfigError::invalid("event_query_limit", "must be positive"));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(ConfigError::invalid("retry.base_delay_ms", "must be positive"));
        }
        self.network_url()?;
        Ok(())
    }

    /// The configured full node, or [`DEFAULT_NETWORK`].
    pub fn network_url(&self) -> ConfigResult<Url> {
        match &self.network {
            Some(url) => Ok(url.clone()),
            None => parse_url(DEFAULT_NETWORK),
        }
    }

    /// Fully-qualified credential struct type, used as the owned-object filter.
    pub fn struct_type(&self) -> String {
        format!("{}::{}::{}", self.package_id, self.module_name, self.struct_name)
    }

    /// Fully-qualified type of the mint event.
    pub fn issued_event_type(&self) -> String {
        format!("{}::{}::{}", self.package_id, self.module_name, self.issued_event)
    }

    /// Fully-qualified entry function, for logs.
    pub fn call_target(&self, function: &str) -> String {
        format!("{}::{}::{}", self.package_id, self.module_name, function)
    }
}

fn parse_url(raw: &str) -> ConfigResult<Url> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::invalid("network", e.to_string()))
}

fn split_addresses(raw: &str) -> Vec<Address> {
    raw.split(',')
        .map(Address::new)
        .filter(|a| !a.is_empty())
        .collect()
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(field, e.to_string()))
}
