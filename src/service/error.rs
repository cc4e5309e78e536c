use thiserror::Error;

use crate::docker::RuntimeError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("this instance does not meet the minimum memory requirement ({required}MB required, {available}MB available)")]
    InsufficientMemory { required: i64, available: i64 },

    #[error("{0} is required")]
    MissingRequired(String),

    #[error("invalid {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("no {key} value is listed for {available}MB of memory")]
    NoMemoryValue { key: String, available: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("no strategy registered for service: {0}")]
    Unregistered(String),

    #[error("{0} does not support console commands")]
    Unsupported(&'static str),
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("a service already exists on this instance")]
    Conflict,

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("no strategy is bound to the current container")]
    UnboundStrategy,

    #[error("catalog error: {0}")]
    Catalog(String),
}
