use thiserror::Error;

/// Why `TaskRunner::start` refused a descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("A task is already running")]
    Busy,

    #[error("{0}")]
    InvalidDescriptor(String),

    #[error("Could not start the worker thread: {0}")]
    Spawn(String),
}

/// Why a started run failed. Each variant becomes one error notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("{0}")]
    Config(String),

    #[error("Could not start the browser: {0}")]
    Launch(String),

    #[error("{0}")]
    Step(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<autohub_browser::Error> for RunError {
    fn from(err: autohub_browser::Error) -> Self {
        match err {
            autohub_browser::Error::Launch(msg) => RunError::Launch(msg),
            autohub_browser::Error::Timeout { locator, waited } => RunError::Step(format!(
                "Timed out after {}s waiting for {}",
                waited.as_secs(),
                locator
            )),
            other => RunError::Step(other.to_string()),
        }
    }
}

impl From<autohub_core::Error> for RunError {
    fn from(err: autohub_core::Error) -> Self {
        RunError::Config(err.to_string())
    }
}
