//! Error types for the result sink

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SinkResult<T> = Result<T, SinkError>;
