use super::{PredictionRequest, PredictionService, ServiceError};
use crate::core::models::table::PredictionTable;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Public MHC class II prediction endpoint of the IEDB analysis resource.
pub const DEFAULT_ENDPOINT: &str = "http://tools-cluster-interface.iedb.org/tools_api/mhcii/";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

// Longest error body echoed back into a log line.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Serialize)]
struct PredictionForm<'a> {
    method: &'a str,
    sequence_text: &'a str,
    allele: &'a str,
}

/// Blocking HTTP client for the IEDB MHC class II tools API.
///
/// Each call is a form-encoded POST of `method`, `sequence_text` and `allele`;
/// the peptide `length` is left unset so the service applies its own default.
/// The response body is a tab-separated table.
#[derive(Debug, Clone)]
pub struct IedbClient {
    client: Client,
    endpoint: String,
}

impl IedbClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("epibind/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PredictionService for IedbClient {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<Option<PredictionTable>, ServiceError> {
        debug!(
            endpoint = %self.endpoint,
            method = %request.method,
            residues = request.residues.len(),
            "Posting prediction request."
        );

        let form = PredictionForm {
            method: &request.method,
            sequence_text: &request.residues,
            allele: &request.allele_set,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        trace!(bytes = body.len(), "Received prediction response.");
        Ok(PredictionTable::from_tsv(&body)?)
    }
}
