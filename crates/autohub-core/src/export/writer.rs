use crate::Result;
use crate::store::DataRow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct CsvExporter;

impl CsvExporter {
    /// Write rows to a CSV file, replacing it if present
    pub fn to_file<'a>(rows: impl IntoIterator<Item = &'a DataRow>, path: &Path) -> Result<usize> {
        tracing::debug!("Writing CSV export to: {}", path.display());

        let file = File::create(path)?;
        let count = Self::to_writer(rows, BufWriter::new(file))?;

        tracing::debug!("Exported {} rows to {}", count, path.display());

        Ok(count)
    }

    /// Write rows as CSV to any writer. Returns the number of rows written.
    pub fn to_writer<'a, W: Write>(
        rows: impl IntoIterator<Item = &'a DataRow>,
        writer: W,
    ) -> Result<usize> {
        let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        csv_writer.write_record(super::CSV_HEADER)?;

        let mut count = 0;
        for row in rows {
            csv_writer.serialize(row)?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    pub fn to_string<'a>(rows: impl IntoIterator<Item = &'a DataRow>) -> Result<String> {
        let mut buffer = Vec::new();
        Self::to_writer(rows, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
