//! Error types for the simulation core

use thiserror::Error;

/// Errors raised while loading or validating the machine/player/run catalog
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("unsupported config file extension: {0}")]
    UnsupportedExtension(String),

    #[error("invalid machine '{id}': {reason}")]
    InvalidMachine { id: String, reason: String },

    #[error("invalid player profile '{id}': {reason}")]
    InvalidPlayer { id: String, reason: String },

    #[error("factory miss: no {kind} registered for id '{id}'")]
    FactoryMiss { kind: &'static str, id: String },
}

/// Result type alias for `rf-core`
pub type CoreResult<T> = Result<T, CoreError>;
