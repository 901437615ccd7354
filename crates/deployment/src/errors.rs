//! Error types for the deployment driver

use contract_registry::RegistryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Backend failed to deploy {component}: {source}")]
    Backend {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Step {index} ({step}) failed: {source}")]
    StepFailed {
        index: usize,
        step: String,
        #[source]
        source: Box<DeploymentError>,
    },
}

pub type Result<T> = std::result::Result<T, DeploymentError>;
