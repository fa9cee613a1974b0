use crate::core::io::layout::OutputLayout;
use crate::core::models::table::{PredictionTable, TableError};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of leading columns kept in the short artifact.
pub const SHORT_COLUMN_COUNT: usize = 8;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error writing '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize table to '{path}': {source}", path = path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub long: PathBuf,
    pub short: PathBuf,
}

/// Writes the long artifact (every column) and then the short artifact
/// (first [`SHORT_COLUMN_COUNT`] columns) for one record.
///
/// `table` is expected to already carry the `protein` column. Existing files
/// are replaced, never appended to.
pub fn write_artifacts(
    table: &PredictionTable,
    layout: &OutputLayout,
    record_id: &str,
) -> Result<ArtifactPaths, PersistError> {
    let long = layout.long_path(record_id);
    write_table(table, &long)?;

    let short = layout.short_path(record_id);
    write_table(&table.truncated(SHORT_COLUMN_COUNT), &short)?;

    Ok(ArtifactPaths { long, short })
}

/// Writes `table` to a sibling temporary file and renames it over `path`,
/// so a reader never observes a half-written artifact.
pub fn write_table(table: &PredictionTable, path: &Path) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    let tmp_path = path.with_extension("csv.partial");
    let file = File::create(&tmp_path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    table
        .write_csv(&mut writer)
        .map_err(|source| PersistError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(io_err)?;
    drop(writer);

    fs::rename(&tmp_path, path).map_err(io_err)
}
