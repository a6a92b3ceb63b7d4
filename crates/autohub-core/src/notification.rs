use crate::record::RunResults;
use serde::{Deserialize, Serialize};

/// One-way message from a running task to whoever listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Notification {
    Log(String),
    Progress(u8),
    Error(String),
    Result(RunResults),
    Finished { success: bool },
}

impl Notification {
    pub fn is_finished(&self) -> bool {
        matches!(self, Notification::Finished { .. })
    }
}
