use thiserror::Error;

use crate::core::types::{EntityId, StorageId};

/// Integration and invariant failures.
///
/// Expected runtime conditions (no target, no path, full storage) are never
/// reported through this type; they surface as `Option`/`bool` results.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    #[error("Storage not found: {0:?}")]
    StorageNotFound(StorageId),

    #[error("Entity {id:?} is not a {expected}")]
    WrongEntityKind { id: EntityId, expected: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
