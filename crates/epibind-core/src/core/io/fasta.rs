use crate::core::models::record::Record;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: FastaParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum FastaParseErrorKind {
    #[error("Sequence data found before the first '>' header")]
    SequenceBeforeHeader,
    #[error("Header line has no identifier")]
    MissingIdentifier,
}

/// Reader for FASTA sequence files.
///
/// The identifier of each record is the first whitespace-delimited token of its
/// header line; the rest of the header is a free-form description and is
/// discarded. Wrapped sequence lines are concatenated and blank lines ignored.
pub struct FastaFile;

impl FastaFile {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Vec<Record>, FastaError> {
        let mut records = Vec::new();
        let mut current: Option<(String, String)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('>') {
                if let Some((id, residues)) = current.take() {
                    records.push(Record::new(id, residues));
                }
                let id = header
                    .split_whitespace()
                    .next()
                    .ok_or(FastaError::Parse {
                        line: line_num,
                        kind: FastaParseErrorKind::MissingIdentifier,
                    })?;
                current = Some((id.to_string(), String::new()));
                continue;
            }

            match current.as_mut() {
                Some((_, residues)) => {
                    residues.extend(trimmed.chars().filter(|c| !c.is_whitespace()));
                }
                None => {
                    return Err(FastaError::Parse {
                        line: line_num,
                        kind: FastaParseErrorKind::SequenceBeforeHeader,
                    });
                }
            }
        }

        if let Some((id, residues)) = current {
            records.push(Record::new(id, residues));
        }

        Ok(records)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, FastaError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(content: &str) -> Result<Vec<Record>, FastaError> {
        FastaFile::read_from(&mut Cursor::new(content))
    }

    #[test]
    fn reads_multiple_wrapped_records() {
        let records = read(">P1 first protein\nMKVL\nSEGE\n>P2\nACDX\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], Record::new("P1", "MKVLSEGE"));
        assert_eq!(records[1], Record::new("P2", "ACDX"));
    }

    #[test]
    fn identifier_stops_at_first_whitespace() {
        let records = read(">sp|P01234|ALB_MOUSE Serum albumin OS=Mus musculus\nMKW\n").unwrap();
        assert_eq!(records[0].id(), "sp|P01234|ALB_MOUSE");
    }

    #[test]
    fn blank_lines_and_crlf_are_ignored() {
        let records = read("\n>P1\r\nMK\r\n\r\nVL\r\n\n").unwrap();
        assert_eq!(records, vec![Record::new("P1", "MKVL")]);
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(read("").unwrap().is_empty());
        assert!(read("\n\n").unwrap().is_empty());
    }

    #[test]
    fn header_without_sequence_yields_empty_record() {
        let records = read(">P1\n>P2\nMK\n").unwrap();
        assert_eq!(records[0], Record::new("P1", ""));
        assert_eq!(records[1], Record::new("P2", "MK"));
    }

    #[test]
    fn sequence_before_header_is_an_error() {
        let err = read("MKVL\n>P1\nMK\n").unwrap_err();
        assert!(matches!(
            err,
            FastaError::Parse {
                line: 1,
                kind: FastaParseErrorKind::SequenceBeforeHeader
            }
        ));
    }

    #[test]
    fn header_without_identifier_is_an_error() {
        let err = read(">P1\nMK\n>   \nVL\n").unwrap_err();
        assert!(matches!(
            err,
            FastaError::Parse {
                line: 3,
                kind: FastaParseErrorKind::MissingIdentifier
            }
        ));
    }

    #[test]
    fn read_from_path_reports_missing_file() {
        let result = FastaFile::read_from_path("/definitely/not/here.fasta");
        assert!(matches!(result, Err(FastaError::Io(_))));
    }
}
