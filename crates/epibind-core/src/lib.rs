//! # epibind Core Library
//!
//! A batch runner for MHC class II binding predictions. Every sequence in an
//! input FASTA file is submitted to a remote prediction service, one request
//! per record, and each successful response is persisted as a full ("long")
//! and a truncated ("short") CSV artifact.
//!
//! ## Architectural Philosophy
//!
//! The library follows the same three-layer split used throughout the project:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Record`,
//!   `PredictionTable`), the FASTA reader, the residue sanitizer, output path
//!   layout, and the seam to the remote prediction service.
//!
//! - **[`engine`]: The Execution Core.** Run configuration, the retrying request
//!   client, the bounded worker pool, and the per-record task runner. Failure of
//!   one record never leaks into its siblings.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into
//!   a complete prediction run with a summary at the end.

pub mod core;
pub mod engine;
pub mod workflows;
