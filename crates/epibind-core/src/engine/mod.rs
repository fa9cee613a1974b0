//! # Engine Module
//!
//! The execution core of a prediction run: everything between "a list of
//! records" and "a directory of artifacts".
//!
//! - **Configuration** ([`config`]) - Immutable run configuration and retry policy
//! - **Retrying Client** ([`retry`]) - Jittered, bounded retries around one remote call
//! - **Worker Pool** ([`pool`]) - Fixed-size pool draining a shared task queue
//! - **Task Runner** ([`task`]) - Per-record sanitize, predict, persist
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Setup-phase errors; per-record failures never surface here

pub mod config;
pub mod error;
pub mod pool;
pub mod progress;
pub mod retry;
pub mod task;
