use crate::core::io::layout::file_key;
use crate::core::models::record::Record;
use crate::core::service::PredictionService;
use crate::engine::config::RunConfig;
use crate::engine::error::EngineError;
use crate::engine::pool::WorkerPool;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::task::{TaskContext, TaskReport, TaskStatus, run_task};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Tallies of a drained run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStats {
    pub total: usize,
    pub saved: usize,
    pub empty: usize,
    pub failed: usize,
    pub persist_failed: usize,
    pub panicked: usize,
    /// Records that never reached a worker because the pool failed to start.
    pub not_dispatched: usize,
    pub elapsed: Duration,
}

impl RunStats {
    fn from_reports(total: usize, reports: &[TaskReport], elapsed: Duration) -> Self {
        let mut stats = Self {
            total,
            not_dispatched: total - reports.len(),
            elapsed,
            ..Self::default()
        };
        for report in reports {
            match report.status {
                TaskStatus::Saved { .. } => stats.saved += 1,
                TaskStatus::Empty => stats.empty += 1,
                TaskStatus::Failed { .. } => stats.failed += 1,
                TaskStatus::PersistFailed { .. } => stats.persist_failed += 1,
                TaskStatus::Panicked { .. } => stats.panicked += 1,
            }
        }
        stats
    }

    /// Records that produced both artifacts (including empty results).
    pub fn completed(&self) -> usize {
        self.saved + self.empty
    }

    /// Dispatched records that ended without artifacts.
    pub fn failures(&self) -> usize {
        self.failed + self.persist_failed + self.panicked
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} record(s) saved ({} with binders, {} empty), {} failed",
            self.completed(),
            self.total,
            self.saved,
            self.empty,
            self.failures()
        )?;
        if self.not_dispatched > 0 {
            write!(f, ", {} never dispatched", self.not_dispatched)?;
        }
        write!(f, " in {:.2} seconds.", self.elapsed.as_secs_f64())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    /// The input held no records; no worker was started.
    NoInput,
    /// Every dispatched task reached a terminal state.
    Completed {
        stats: RunStats,
        reports: Vec<TaskReport>,
    },
}

/// Runs a prediction for every record and waits for the pool to drain.
///
/// Only setup problems are returned as errors: duplicate identifiers are
/// rejected before any work is dispatched. A pool that fails to start is
/// logged as critical and the run completes with every record counted as
/// not dispatched. Per-record failures are reported in the summary.
#[instrument(skip_all, name = "prediction_workflow")]
pub fn run<S: PredictionService>(
    records: Vec<Record>,
    config: &RunConfig,
    service: &S,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError> {
    let total = records.len();
    info!("Number of sequences: {}", total);

    if total == 0 {
        warn!("No sequences found in the input. Nothing to dispatch.");
        return Ok(RunSummary::NoInput);
    }

    ensure_unique_ids(&records)?;
    let ids: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();

    let start = Instant::now();
    info!(
        workers = config.worker_count,
        method = %config.method,
        max_retries = config.retry.max_retries,
        "Process start."
    );
    reporter.report(Progress::PhaseStart {
        name: "Predicting binders",
    });
    reporter.report(Progress::TaskStart {
        total: total as u64,
    });

    let reports = match WorkerPool::new(config.worker_count) {
        Ok(pool) => {
            let ctx = TaskContext::new(config, service);
            let failures = AtomicUsize::new(0);
            let results = pool.run_with_hook(
                records,
                |record| run_task(&record, &ctx),
                |result| {
                    let succeeded = matches!(
                        result,
                        Ok(TaskReport {
                            status: TaskStatus::Saved { .. } | TaskStatus::Empty,
                            ..
                        })
                    );
                    if !succeeded {
                        let failed = failures.fetch_add(1, Ordering::Relaxed) + 1;
                        reporter.report(Progress::StatusUpdate {
                            text: format!("{} failed", failed),
                        });
                    }
                    reporter.report(Progress::TaskIncrement { amount: 1 });
                },
            );

            results
                .into_iter()
                .map(|result| {
                    result.unwrap_or_else(|panic| {
                        error!(
                            record = %ids[panic.index],
                            reason = %panic.message,
                            "Task panicked; sibling tasks are unaffected."
                        );
                        TaskReport {
                            record_id: ids[panic.index].clone(),
                            status: TaskStatus::Panicked {
                                reason: panic.message,
                            },
                        }
                    })
                })
                .collect()
        }
        Err(e) => {
            error!(
                severity = "critical",
                error = %e,
                "A critical error occurred during worker pool setup."
            );
            Vec::new()
        }
    };

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let stats = RunStats::from_reports(total, &reports, start.elapsed());
    info!("Process end.");
    info!("Total time taken: {:.2} seconds.", stats.elapsed.as_secs_f64());
    info!("{}", stats);

    Ok(RunSummary::Completed { stats, reports })
}

/// Rejects record sets in which two identifiers map to the same output file.
pub fn ensure_unique_ids(records: &[Record]) -> Result<(), EngineError> {
    let mut by_key: HashMap<String, Vec<&str>> = HashMap::new();
    for record in records {
        by_key
            .entry(file_key(record.id()))
            .or_default()
            .push(record.id());
    }

    let mut duplicates: Vec<String> = by_key
        .into_values()
        .filter(|ids| ids.len() > 1)
        .flatten()
        .map(str::to_string)
        .collect();

    if duplicates.is_empty() {
        return Ok(());
    }

    duplicates.sort();
    duplicates.dedup();
    error!(ids = ?duplicates, "Duplicate record identifiers in input.");
    Err(EngineError::DuplicateRecords { ids: duplicates })
}
