use super::config::RunConfig;
use super::retry::{Outcome, RetryingClient};
use crate::core::io::artifacts::write_artifacts;
use crate::core::models::record::Record;
use crate::core::models::table::PredictionTable;
use crate::core::sanitize::sanitize_residues;
use crate::core::service::{PredictionRequest, PredictionService};
use std::thread;
use tracing::{debug, error, info, instrument};

/// Terminal state of one record's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Both artifacts were written.
    Saved { rows: usize },
    /// The service found no binders; header-only artifacts were written.
    Empty,
    /// Retries were exhausted. Nothing was written.
    Failed { attempts: usize, reason: String },
    /// A prediction was obtained but could not be persisted.
    PersistFailed { reason: String },
    /// The task panicked. Contained by the worker pool.
    Panicked { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub record_id: String,
    pub status: TaskStatus,
}

/// Everything a task reads. Shared by reference across all workers.
pub struct TaskContext<'a, S> {
    pub config: &'a RunConfig,
    pub service: &'a S,
}

impl<'a, S: PredictionService> TaskContext<'a, S> {
    pub fn new(config: &'a RunConfig, service: &'a S) -> Self {
        Self { config, service }
    }
}

pub fn build_request(record: &Record, config: &RunConfig) -> PredictionRequest {
    PredictionRequest {
        residues: sanitize_residues(record.residues()),
        allele_set: config.allele_set.clone(),
        method: config.method.clone(),
    }
}

/// Processes one record end to end: sanitize, predict with retries, persist.
///
/// Never returns an error and never panics on a failed prediction or write;
/// the result is always a [`TaskReport`].
#[instrument(skip_all, name = "record_task", fields(record = %record.id()))]
pub fn run_task<S: PredictionService>(record: &Record, ctx: &TaskContext<'_, S>) -> TaskReport {
    let stagger = ctx.config.stagger.sample(&mut rand::thread_rng());
    if !stagger.is_zero() {
        debug!(delay_ms = stagger.as_millis() as u64, "Staggering task start.");
        thread::sleep(stagger);
    }

    info!(residues = record.len(), "Processing record.");
    let request = build_request(record, ctx.config);

    let client = RetryingClient::new(ctx.service, &ctx.config.retry);
    let status = match client.submit(&request, record.id()) {
        Outcome::PermanentFailure { attempts, reason } => TaskStatus::Failed { attempts, reason },
        Outcome::Empty(table) => persist(record, table, ctx.config).map_or_else(
            |reason| TaskStatus::PersistFailed { reason },
            |_| TaskStatus::Empty,
        ),
        Outcome::Success(table) => persist(record, table, ctx.config).map_or_else(
            |reason| TaskStatus::PersistFailed { reason },
            |rows| TaskStatus::Saved { rows },
        ),
    };

    TaskReport {
        record_id: record.id().to_string(),
        status,
    }
}

fn persist(record: &Record, table: PredictionTable, config: &RunConfig) -> Result<usize, String> {
    info!(record = %record.id(), "Writing files.");
    let table = table.with_protein_column(record.id());

    match write_artifacts(&table, &config.layout, record.id()) {
        Ok(paths) => {
            debug!(long = ?paths.long, short = ?paths.short, "Artifacts written.");
            info!(record = %record.id(), "Completed and saved.");
            Ok(table.num_rows())
        }
        Err(e) => {
            error!(record = %record.id(), error = %e, "Failed to persist prediction.");
            Err(e.to_string())
        }
    }
}
