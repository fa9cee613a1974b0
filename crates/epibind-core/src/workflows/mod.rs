//! # Workflows Module
//!
//! Top-level entry points that tie `core` and `engine` together.
//!
//! - **Prediction Workflow** ([`predict`]) - Validates the record set, fans it
//!   out over the worker pool, and summarizes the run.

pub mod predict;
