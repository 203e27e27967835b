//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor, and the environment-driven configuration it
//! is built from.

use std::sync::Arc;

use thiserror::Error;

use raffle_engine::{EntropySource, OsEntropy, RaffleService, SeededEntropy};
use raffle_store::MemoryStore;

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Error reading configuration from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("invalid value {value:?} for {var}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Seed for the winner-draw RNG. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            rng_seed: None,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `RAFFLE_RNG_SEED` and `LOG_FORMAT` from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: v.clone(),
            })?,
            None => defaults.port,
        };
        let rng_seed = match lookup("RAFFLE_RNG_SEED") {
            Some(v) => Some(v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "RAFFLE_RNG_SEED",
                value: v.clone(),
            })?),
            None => None,
        };
        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };
        Ok(Self {
            port,
            rng_seed,
            log_format,
        })
    }

    /// The draw entropy source this configuration selects.
    pub fn entropy(&self) -> Arc<dyn EntropySource> {
        match self.rng_seed {
            Some(seed) => Arc::new(SeededEntropy::new(seed)),
            None => Arc::new(OsEntropy),
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Raffle engine facade.
    pub service: RaffleService,
    /// Configuration the state was built from.
    pub config: AppConfig,
}

impl AppState {
    /// Create state with default configuration over an empty in-memory store.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create state over an empty in-memory store.
    pub fn with_config(config: AppConfig) -> Self {
        let service = RaffleService::with_store(Arc::new(MemoryStore::new()), config.entropy());
        Self::with_service(service, config)
    }

    /// Create state around an existing service.
    pub fn with_service(service: RaffleService, config: AppConfig) -> Self {
        Self { service, config }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
