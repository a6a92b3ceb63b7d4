use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid script: {0}")]
    InvalidScript(String),

    #[error("Invalid export file: {0}")]
    InvalidExport(String),

    #[error("Invalid proxy address: {0}")]
    InvalidProxy(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Could not determine {0} directory")]
    MissingDirectory(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
