//! Error types for player decision engines

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("invalid player profile '{id}': {reason}")]
    InvalidProfile { id: String, reason: String },

    #[error("oracle load failure for cluster '{cluster}': {reason}")]
    OracleLoadFailure { cluster: String, reason: String },

    #[error("oracle prediction failure: {0}")]
    OraclePredictionFailure(String),
}

pub type PlayerResult<T> = Result<T, PlayerError>;
