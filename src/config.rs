//! Configuration for TableBrain
//!
//! Centralized configuration with sensible defaults, plus discovery of the
//! store address from environment variables.

use std::path::PathBuf;

use crate::error::{BrainError, Result};

/// Address used when nothing in the environment names a store
pub const DEFAULT_URL: &str = "sqlite://brain.db";

/// Generic address variables, checked in this order
const URL_VARS: [&str; 2] = ["SQLITE_URL", "DATABASE_URL"];

const TABLE_NAME_VAR: &str = "BRAIN_TABLE_NAME";
const PREFIX_VAR: &str = "BRAIN_DATA_PREFIX";

/// Main configuration for a Brain instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Store address: `sqlite::memory:`, `sqlite://<path>` or a bare path
    pub url: String,

    /// Name of the single backing table
    pub table_name: String,

    /// SQLite busy timeout (milliseconds)
    pub busy_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Keyspace Configuration
    // -------------------------------------------------------------------------
    /// Prefix prepended to every logical key (`{prefix}:{key}`)
    pub key_prefix: String,

    /// Whether other stores share the table. When set, `reset` only deletes
    /// rows under `key_prefix`.
    pub shared_table: bool,

    // -------------------------------------------------------------------------
    // Transaction Configuration
    // -------------------------------------------------------------------------
    /// What the sequencer issues after a failed unit of work
    pub transaction_mode: TransactionMode,
}

/// Outcome applied to a transaction whose unit of work failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// COMMIT anyway: writes made before the failure stay durable
    #[default]
    CommitOnFailure,

    /// ROLLBACK: the unit is all-or-nothing
    RollbackOnFailure,
}

/// Where the store address came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSource {
    /// A provider-injected `SQLITE_<NAME>_URL` variable
    Provider(String),

    /// One of the generic URL variables
    Generic(String),

    /// Nothing found; using [`DEFAULT_URL`]
    Default,
}

/// Parsed store location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            table_name: "brain".to_string(),
            busy_timeout_ms: 5000,
            key_prefix: "data".to_string(),
            shared_table: false,
            transaction_mode: TransactionMode::CommitOnFailure,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve a config from the process environment
    pub fn from_env() -> (Self, AddressSource) {
        Self::from_vars(std::env::vars())
    }

    /// Resolve a config from an explicit set of variables
    ///
    /// Address resolution order:
    /// 1. `SQLITE_<NAME>_URL` (first in lexicographic order)
    /// 2. `SQLITE_URL`, then `DATABASE_URL`
    /// 3. [`DEFAULT_URL`]
    pub fn from_vars<I, K, V>(vars: I) -> (Self, AddressSource)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars: Vec<(String, String)> =
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        vars.sort();

        let lookup = |name: &str| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        let mut config = Config::default();

        let provider = vars.iter().find(|(k, _)| is_provider_var(k));
        let source = if let Some((name, url)) = provider {
            config.url = url.clone();
            AddressSource::Provider(name.clone())
        } else if let Some((name, url)) = URL_VARS
            .iter()
            .find_map(|name| lookup(name).map(|url| (name.to_string(), url)))
        {
            config.url = url;
            AddressSource::Generic(name)
        } else {
            AddressSource::Default
        };

        if let Some(table) = lookup(TABLE_NAME_VAR) {
            config.table_name = table;
        }
        if let Some(prefix) = lookup(PREFIX_VAR) {
            config.key_prefix = prefix;
        }

        (config, source)
    }

    /// Check the settings that end up spliced into SQL text
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.table_name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if !valid {
            return Err(BrainError::Config(format!(
                "invalid table name '{}'",
                self.table_name
            )));
        }

        if self.key_prefix.is_empty() {
            return Err(BrainError::Config("key prefix must not be empty".to_string()));
        }

        self.location().map(|_| ())
    }

    /// Parse `url` into a store location
    pub fn location(&self) -> Result<StoreLocation> {
        let url = self.url.trim();
        match url {
            "" => Err(BrainError::Config("empty store url".to_string())),
            ":memory:" | "sqlite::memory:" | "sqlite://:memory:" => Ok(StoreLocation::Memory),
            _ => {
                let path = url.strip_prefix("sqlite://").unwrap_or(url);
                if path.is_empty() {
                    return Err(BrainError::Config(format!("no path in store url '{}'", url)));
                }
                Ok(StoreLocation::File(PathBuf::from(path)))
            }
        }
    }
}

fn is_provider_var(name: &str) -> bool {
    name.strip_prefix("SQLITE_")
        .and_then(|rest| rest.strip_suffix("_URL"))
        .map(|middle| {
            !middle.is_empty()
                && middle
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
        .unwrap_or(false)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store address
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Use a private in-memory store
    pub fn in_memory(mut self) -> Self {
        self.config.url = "sqlite::memory:".to_string();
        self
    }

    /// Set the backing table name
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.config.table_name = name.into();
        self
    }

    /// Set the key namespace prefix
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Mark the table as shared with other stores
    pub fn shared_table(mut self, shared: bool) -> Self {
        self.config.shared_table = shared;
        self
    }

    /// Set the failed-transaction behaviour
    pub fn transaction_mode(mut self, mode: TransactionMode) -> Self {
        self.config.transaction_mode = mode;
        self
    }

    /// Set the SQLite busy timeout (in milliseconds)
    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.config.busy_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
