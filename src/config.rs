//! Bridge configuration.
//!
//! Read from the environment of the host process. Every setting has a
//! default, so an empty environment gives a working bridge.

use std::fmt;

use thiserror::Error;

use crate::core::types::{CircuitRef, InputError};

/// Comma-separated circuits the default engine can prove.
pub const CIRCUITS_ENV: &str = "STWO_DLC_CIRCUITS";

/// Hex-encoded 32-byte Ed25519 seed for the oracle key.
pub const ORACLE_KEY_ENV: &str = "STWO_DLC_ORACLE_KEY_HEX";

/// Log filter directive.
pub const LOG_ENV: &str = "STWO_DLC_LOG";

/// Circuit known by default.
pub const DEFAULT_CIRCUIT: &str = "hash_integrity";

/// Where the oracle signing key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum OracleKeySource {
    /// Fixed seed supplied by the host.
    Seed([u8; 32]),
    /// Random key generated at startup.
    Ephemeral,
}

impl fmt::Debug for OracleKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed(_) => write!(f, "Seed(<redacted>)"),
            Self::Ephemeral => write!(f, "Ephemeral"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Oracle key is not 32 bytes of hex.
    #[error("{ORACLE_KEY_ENV} must be 64 hex characters")]
    InvalidOracleKey,

    /// Circuit list is empty.
    #[error("{CIRCUITS_ENV} names no circuits")]
    EmptyCircuitList,

    /// A circuit name is malformed.
    #[error("invalid circuit {name:?}: {source}")]
    InvalidCircuit {
        /// Name as given.
        name: String,
        /// Parse error.
        source: InputError,
    },
}

/// Bridge configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Circuits the default engine can prove.
    pub circuits: Vec<CircuitRef>,
    /// Oracle key source.
    pub oracle_key: OracleKeySource,
    /// Log filter directive.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            circuits: CircuitRef::parse(DEFAULT_CIRCUIT).into_iter().collect(),
            oracle_key: OracleKeySource::Ephemeral,
            log_filter: crate::logging::default_filter().to_string(),
        }
    }
}

impl BridgeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(list) = lookup(CIRCUITS_ENV) {
            config.circuits = parse_circuits(&list)?;
        }

        if let Some(seed_hex) = lookup(ORACLE_KEY_ENV) {
            let mut seed = [0u8; 32];
            hex::decode_to_slice(seed_hex.trim(), &mut seed).map_err(|_| ConfigError::InvalidOracleKey)?;
            config.oracle_key = OracleKeySource::Seed(seed);
        }

        if let Some(filter) = lookup(LOG_ENV) {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }

        Ok(config)
    }
}

fn parse_circuits(list: &str) -> Result<Vec<CircuitRef>, ConfigError> {
    let circuits = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            CircuitRef::parse(name).map_err(|source| ConfigError::InvalidCircuit {
                name: name.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if circuits.is_empty() {
        return Err(ConfigError::EmptyCircuitList);
    }
    Ok(circuits)
}
