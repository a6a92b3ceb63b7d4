use crate::task::TaskKind;
use serde::{Deserialize, Serialize};

/// One result entry produced by a run. The shape depends on the task kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultRecord {
    /// A search hit
    Link { title: String, url: String },
    /// A scraped product listing
    Product {
        name: String,
        price: String,
        url: String,
    },
    /// Outcome of a login or post
    Status {
        status: String,
        message: String,
        url: String,
    },
    /// A value collected by a custom script
    Extracted { label: String, value: String },
}

impl ResultRecord {
    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        ResultRecord::Link {
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn product(
        name: impl Into<String>,
        price: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        ResultRecord::Product {
            name: name.into(),
            price: price.into(),
            url: url.into(),
        }
    }

    pub fn status(
        status: impl Into<String>,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        ResultRecord::Status {
            status: status.into(),
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn extracted(label: impl Into<String>, value: impl Into<String>) -> Self {
        ResultRecord::Extracted {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Short human-readable summary, used for log lines
    pub fn summary(&self) -> String {
        match self {
            ResultRecord::Link { title, .. } => title.clone(),
            ResultRecord::Product { name, price, .. } => format!("{} ({})", name, price),
            ResultRecord::Status { status, message, .. } => format!("{}: {}", status, message),
            ResultRecord::Extracted { label, value } => format!("{} = {}", label, value),
        }
    }
}

/// Payload of a result notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResults {
    pub kind: TaskKind,
    pub source: String,
    pub records: Vec<ResultRecord>,
}

impl RunResults {
    pub fn new(kind: TaskKind, source: impl Into<String>, records: Vec<ResultRecord>) -> Self {
        Self {
            kind,
            source: source.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
