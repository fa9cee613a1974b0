//! The boundary to the remote binding-prediction service.
//!
//! The engine only ever talks to a [`PredictionService`]; the HTTP
//! implementation lives in [`iedb`], and tests substitute scripted fakes.

pub mod iedb;

use crate::core::models::table::{PredictionTable, TableError};
use thiserror::Error;

/// One logical prediction call, derived from a record plus run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub residues: String,
    pub allele_set: String,
    pub method: String,
}

/// Signals from a single call attempt. Every variant is treated as transient
/// by the retrying client.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Service returned no payload")]
    MissingPayload,

    #[error("Malformed prediction table: {0}")]
    Malformed(#[from] TableError),
}

/// A remote binding-prediction backend.
///
/// `Ok(None)` means the call completed without an error signal but carried no
/// payload; `Ok(Some(table))` may hold an empty table when the service found no
/// binders.
pub trait PredictionService: Send + Sync {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<Option<PredictionTable>, ServiceError>;
}
