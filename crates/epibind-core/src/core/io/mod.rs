//! Input and output for a prediction run.
//!
//! Reading FASTA sequence files, deriving deterministic per-record output
//! paths, and persisting prediction tables as CSV artifacts.

pub mod artifacts;
pub mod fasta;
pub mod layout;
