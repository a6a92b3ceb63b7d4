use crate::store::DataRow;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct CsvImporter;

impl CsvImporter {
    /// Read rows back from an exported CSV file
    pub fn from_file(path: &Path) -> Result<Vec<DataRow>> {
        tracing::debug!("Reading CSV from: {}", path.display());

        let file = File::open(path)?;
        let rows = Self::from_reader(BufReader::new(file))?;

        tracing::debug!("Read {} rows from {}", rows.len(), path.display());

        Ok(rows)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<DataRow>> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.iter().ne(super::CSV_HEADER) {
            return Err(Error::InvalidExport(format!(
                "expected CSV columns {}, found {}",
                super::CSV_HEADER.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        csv_reader
            .deserialize()
            .map(|row| row.map_err(Error::from))
            .collect()
    }

    pub fn from_str(content: &str) -> Result<Vec<DataRow>> {
        Self::from_reader(content.as_bytes())
    }
}
