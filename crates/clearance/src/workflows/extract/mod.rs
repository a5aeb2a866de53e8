//! Ingestion of county criminal-history extracts into `ConvictionRow`s.

mod normalizer;
mod parser;

use crate::workflows::relief::domain::ConvictionRow;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read criminal history extract: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid criminal history CSV data: {0}")]
    Csv(#[from] csv::Error),
}

pub struct ExtractReader;

impl ExtractReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ConvictionRow>, ExtractError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows come back in file order; `row_index` is the zero-based data row position.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ConvictionRow>, ExtractError> {
        let rows = parser::parse_records(reader)?;
        debug!(rows = rows.len(), "parsed criminal history extract");
        Ok(rows)
    }
}
