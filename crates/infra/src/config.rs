//! Configuration loading and representation.
//!
//! Read from the process environment:
//!
//! - `USE_PERSISTENT_STORES`: `true`/`1` selects Postgres, anything else (or unset) in-memory
//! - `DATABASE_URL`: required when persistent
//! - `DATABASE_MAX_CONNECTIONS`: pool size, default 5

use thiserror::Error;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where categories are stored.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

// Connection strings carry credentials; keep them out of logs.
impl core::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreBackend::InMemory => f.write_str("InMemory"),
            StoreBackend::Postgres {
                max_connections, ..
            } => f
                .debug_struct("Postgres")
                .field("database_url", &"<redacted>")
                .field("max_connections", max_connections)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraConfig {
    pub store: StoreBackend,
}

impl InfraConfig {
    pub fn in_memory() -> Self {
        Self {
            store: StoreBackend::InMemory,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests, layered sources).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let use_persistent = lookup("USE_PERSISTENT_STORES")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        if !use_persistent {
            return Ok(Self::in_memory());
        }

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => parse_max_connections(&raw)?,
        };

        Ok(Self {
            store: StoreBackend::Postgres {
                database_url,
                max_connections,
            },
        })
    }
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn parse_max_connections(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "DATABASE_MAX_CONNECTIONS",
        value: raw.to_string(),
        reason,
    };
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(invalid("must be at least 1".to_string())),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(e.to_string())),
    }
}
