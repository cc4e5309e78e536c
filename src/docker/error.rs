use bollard::errors::Error as BollardError;
use thiserror::Error;

/// Runtime failures normalized to what callers can act on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("container runtime unavailable: {0}")]
    Transient(String),

    #[error("malformed runtime request: {0}")]
    Fatal(String),
}

impl From<BollardError> for RuntimeError {
    fn from(err: BollardError) -> Self {
        match err {
            BollardError::DockerResponseServerError { status_code, message } => match status_code {
                404 => RuntimeError::NotFound(message),
                409 => RuntimeError::Conflict(message),
                400 => RuntimeError::Fatal(message),
                _ => RuntimeError::Transient(format!("{status_code}: {message}")),
            },
            BollardError::JsonDataError { .. } | BollardError::JsonSerdeError { .. } => {
                RuntimeError::Fatal(err.to_string())
            }
            other => RuntimeError::Transient(other.to_string()),
        }
    }
}

/// Docker answers 304 when a container is already in the requested state.
pub(super) fn is_not_modified(err: &BollardError) -> bool {
    matches!(err, BollardError::DockerResponseServerError { status_code: 304, .. })
}
