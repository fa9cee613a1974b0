//! # Core Module
//!
//! Fundamental building blocks for a prediction run.
//!
//! - **Data Models** ([`models`]) - Sequence records and tabular prediction results
//! - **File I/O** ([`io`]) - FASTA input, deterministic output layout, CSV artifacts
//! - **Remote Service** ([`service`]) - The prediction service seam and its HTTP implementation
//! - **Sanitization** ([`sanitize`]) - Canonicalization of ambiguous residue codes
//! - **Allele Presets** ([`alleles`]) - Built-in allele sets per species

pub mod alleles;
pub mod io;
pub mod models;
pub mod sanitize;
pub mod service;
