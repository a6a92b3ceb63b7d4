use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Timed out after {}s waiting for {locator}", waited.as_secs_f32())]
    Timeout { locator: String, waited: Duration },

    #[error("Browser session is closed")]
    SessionClosed,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        match err {
            chromiumoxide::error::CdpError::NotFound => Error::NotFound("no matching node".to_string()),
            other => Error::Cdp(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
