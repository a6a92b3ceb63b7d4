use crate::record::{ResultRecord, RunResults};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// One row of collected data, shaped for tabular display and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRow {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub status: String,
    pub details: String,
}

impl DataRow {
    pub fn from_record(source: &str, record: &ResultRecord, timestamp: DateTime<Utc>) -> Self {
        let (kind, content, status, details) = match record {
            ResultRecord::Link { title, url } => ("search", title.clone(), "ok".to_string(), url.clone()),
            ResultRecord::Product { name, price, url } => (
                "product",
                name.clone(),
                "ok".to_string(),
                format!("{} | {}", price, url),
            ),
            ResultRecord::Status {
                status,
                message,
                url,
            } => ("status", message.clone(), status.clone(), url.clone()),
            ResultRecord::Extracted { label, value } => {
                ("extracted", value.clone(), "ok".to_string(), label.clone())
            }
        };

        Self {
            timestamp,
            source: source.to_string(),
            kind: kind.to_string(),
            content,
            status,
            details,
        }
    }

    /// Case-insensitive substring match over every column
    pub fn matches(&self, keyword: &str) -> bool {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            self.timestamp.to_rfc3339(),
            self.source.clone(),
            self.kind.clone(),
            self.content.clone(),
            self.status.clone(),
            self.details.clone(),
        ]
        .iter()
        .any(|column| column.to_lowercase().contains(&needle))
    }
}

/// Collected rows, persisted as JSON
#[derive(Debug, Default)]
pub struct DataStore {
    path: Option<PathBuf>,
    rows: Vec<DataRow>,
}

impl DataStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store from disk. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let rows = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader)?
        } else {
            Vec::new()
        };

        tracing::debug!("Loaded {} data rows from {}", rows.len(), path.display());

        Ok(Self {
            path: Some(path.to_path_buf()),
            rows,
        })
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.rows)?;

        tracing::debug!("Saved {} data rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Append every record of a run, stamped with the current time. Returns the number added.
    pub fn append(&mut self, results: &RunResults) -> usize {
        self.append_at(results, Utc::now())
    }

    pub fn append_at(&mut self, results: &RunResults, timestamp: DateTime<Utc>) -> usize {
        self.rows.extend(
            results
                .records
                .iter()
                .map(|record| DataRow::from_record(&results.source, record, timestamp)),
        );
        results.records.len()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = DataRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn filter(&self, keyword: &str) -> Vec<&DataRow> {
        self.rows.iter().filter(|row| row.matches(keyword)).collect()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
