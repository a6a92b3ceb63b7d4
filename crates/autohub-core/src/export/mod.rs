mod reader;
mod writer;

pub use reader::CsvImporter;
pub use writer::CsvExporter;

/// Column order of exported files
pub const CSV_HEADER: [&str; 6] = ["timestamp", "source", "type", "content", "status", "details"];
