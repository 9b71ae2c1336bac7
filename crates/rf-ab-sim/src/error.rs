//! Error types for catalog setup and the simulation executor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("factory miss: no {kind} registered for id '{id}'")]
    FactoryMiss { kind: &'static str, id: String },

    #[error("sink error: {0}")]
    Sink(#[from] rf_sim_sink::SinkError),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
