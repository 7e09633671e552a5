//! Errors produced by the preprocessing engine.
use thiserror::Error;

/// Errors that can occur while loading or preprocessing a formula.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("variable index {index} exceeds the supported maximum")]
    VarIndexTooLarge { index: usize },

    #[error("formula contains an empty clause and is therefore false regardless of any expansion")]
    TriviallyFalse,

    #[error("option '{name}' is not recognized")]
    UnknownOption { name: String },

    #[error("option '{name}' has an invalid value: '{value}'")]
    InvalidOptionValue { name: String, value: String },

    #[error("{feature} requires an external QBF solver, which this preprocessor does not call out to")]
    Unsupported { feature: String },

    #[error(transparent)]
    Dimacs(#[from] anyhow::Error),
}
