use csv::{ReaderBuilder, WriterBuilder};
use std::io::Write;
use thiserror::Error;

/// Name of the column that carries the originating record identifier.
pub const PROTEIN_COLUMN: &str = "protein";

// A plain-text error message from the service parses as a single column.
const MIN_COLUMNS: usize = 2;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Table header has {found} column(s), expected at least {}", MIN_COLUMNS)]
    TooFewColumns { found: usize },
}

/// An ordered table of prediction rows with a service-defined column schema.
///
/// Cells are kept as strings; the table is only ever re-serialized, never
/// interpreted numerically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PredictionTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parses a tab-separated service response.
    ///
    /// Returns `Ok(None)` when the body carries no payload at all (empty or
    /// whitespace only), and an empty table when only the header is present.
    pub fn from_tsv(body: &str) -> Result<Option<Self>, TableError> {
        if body.trim().is_empty() {
            return Ok(None);
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.len() < MIN_COLUMNS {
            return Err(TableError::TooFewColumns {
                found: headers.len(),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Some(Self { headers, rows }))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a [`PROTEIN_COLUMN`] holding `protein_id` on every row.
    ///
    /// If the column already exists its values are overwritten in place.
    pub fn with_protein_column(mut self, protein_id: &str) -> Self {
        match self.headers.iter().position(|h| h == PROTEIN_COLUMN) {
            Some(idx) => {
                for cell in self.rows.iter_mut().filter_map(|row| row.get_mut(idx)) {
                    *cell = protein_id.to_string();
                }
            }
            None => {
                self.headers.push(PROTEIN_COLUMN.to_string());
                for row in &mut self.rows {
                    row.push(protein_id.to_string());
                }
            }
        }
        self
    }

    /// Returns a copy restricted to the first `n` columns.
    pub fn truncated(&self, n: usize) -> Self {
        let width = n.min(self.headers.len());
        Self {
            headers: self.headers[..width].to_vec(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().take(width).cloned().collect())
                .collect(),
        }
    }

    /// Serializes the table as comma-separated values with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut csv_writer = WriterBuilder::new().from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
