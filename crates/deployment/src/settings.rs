//! Deployment settings
//!
//! Values come from an optional TOML file, then environment variables
//! prefixed with `CONTRACT_DEPLOY_` (nested keys use `__`, e.g.
//! `CONTRACT_DEPLOY_ORACLES__TIME_PROVIDER`). Anything unset keeps its
//! default.

use crate::errors::*;
use config::{Config, Environment, File as ConfigFile};
use contract_registry::{Address, ADDRESS_BYTES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How time and price oracles are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WiringMode {
    /// Deploy in-process stand-ins for the time provider and price feed
    #[default]
    Mock,
    /// Bind the configured external oracle addresses
    Real,
}

/// External oracle addresses, required in [`WiringMode::Real`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub time_provider: Option<Address>,
    pub underlying_feed: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Principal that deploys and owns the registry
    pub owner: Address,
    pub mode: WiringMode,
    pub oracles: OracleConfig,
    /// Persist the registry journal here; in-memory when unset
    pub journal_path: Option<PathBuf>,
    /// Names frozen once wiring completes
    pub freeze: Vec<String>,
    pub logging: LoggingConfig,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        let mut owner = [0u8; ADDRESS_BYTES];
        owner[ADDRESS_BYTES - 1] = 1;

        Self {
            owner: Address(owner),
            mode: WiringMode::Mock,
            oracles: OracleConfig::default(),
            journal_path: None,
            freeze: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DeploymentConfig {
    /// Load configuration from `path` (if given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(DeploymentError::InvalidConfig(format!(
                    "configuration file {} not found",
                    path.display()
                )));
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CONTRACT_DEPLOY")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: DeploymentConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner.is_zero() {
            return Err(DeploymentError::InvalidConfig(
                "owner must not be the zero address".to_string(),
            ));
        }

        if self.mode == WiringMode::Real {
            let missing: Vec<&str> = [
                ("oracles.time_provider", self.oracles.time_provider),
                ("oracles.underlying_feed", self.oracles.underlying_feed),
            ]
            .into_iter()
            .filter(|(_, address)| address.map_or(true, |a| a.is_zero()))
            .map(|(key, _)| key)
            .collect();

            if !missing.is_empty() {
                return Err(DeploymentError::InvalidConfig(format!(
                    "real wiring requires {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }
}
