//! Error types for the contract registry

use crate::types::Principal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unauthorized: {caller} is not the registry owner")]
    Unauthorized { caller: Principal },

    #[error("Unknown contract name: {name}")]
    UnknownName { name: String },

    #[error("Contract name is frozen: {name}")]
    FrozenName { name: String },

    #[error("Invalid address for {name}: the zero address is not allowed")]
    InvalidAddress { name: String },

    #[error("Alias cannot point at itself: {alias}")]
    SelfAlias { alias: String },

    #[error("Contract name already registered: {name}")]
    AlreadyRegistered { name: String },

    #[error("Contract name must not be empty")]
    InvalidName,

    #[error("Journal error: {0}")]
    Journal(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RegistryError {
    pub(crate) fn unknown(name: &str) -> Self {
        RegistryError::UnknownName {
            name: name.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
