use super::config::RetryPolicy;
use crate::core::models::table::PredictionTable;
use crate::core::service::{PredictionRequest, PredictionService, ServiceError};
use std::thread;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Terminal result of one record's attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service returned at least one row.
    Success(PredictionTable),
    /// The service answered with a well-formed table containing no binders.
    /// This is a valid completion and is never retried.
    Empty(PredictionTable),
    /// Every permitted attempt failed.
    PermanentFailure { attempts: usize, reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::PermanentFailure { .. })
    }
}

/// How a single attempt ended.
enum Attempt {
    Rows(PredictionTable),
    NoRows(PredictionTable),
    Transient(ServiceError),
}

impl From<Result<Option<PredictionTable>, ServiceError>> for Attempt {
    fn from(result: Result<Option<PredictionTable>, ServiceError>) -> Self {
        match result {
            Ok(Some(table)) if table.is_empty() => Attempt::NoRows(table),
            Ok(Some(table)) => Attempt::Rows(table),
            Ok(None) => Attempt::Transient(ServiceError::MissingPayload),
            Err(e) => Attempt::Transient(e),
        }
    }
}

/// Wraps a [`PredictionService`] with jittered, bounded retries.
///
/// Every attempt is preceded by a random pause drawn from the policy's jitter
/// range. Transient failures (errors and absent payloads) are followed by the
/// fixed retry delay. The client never returns an error: exhaustion is folded
/// into [`Outcome::PermanentFailure`].
pub struct RetryingClient<'a, S> {
    service: &'a S,
    policy: &'a RetryPolicy,
}

impl<'a, S: PredictionService> RetryingClient<'a, S> {
    pub fn new(service: &'a S, policy: &'a RetryPolicy) -> Self {
        Self { service, policy }
    }

    #[instrument(level = "debug", skip_all, fields(record = %key))]
    pub fn submit(&self, request: &PredictionRequest, key: &str) -> Outcome {
        let max = self.policy.max_retries;
        let mut last_error: Option<ServiceError> = None;

        for attempt in 1..=max {
            pause(self.policy.jitter.sample(&mut rand::thread_rng()));

            match Attempt::from(self.service.predict(request)) {
                Attempt::Rows(table) => {
                    info!(
                        record = %key,
                        attempt,
                        rows = table.num_rows(),
                        "Prediction query succeeded."
                    );
                    return Outcome::Success(table);
                }
                Attempt::NoRows(table) => {
                    warn!(
                        record = %key,
                        attempt,
                        "Prediction query succeeded but returned no rows. Not retrying, treating as completion."
                    );
                    return Outcome::Empty(table);
                }
                Attempt::Transient(e) if attempt < max => {
                    warn!(
                        record = %key,
                        attempt,
                        max_retries = max,
                        error = %e,
                        "Prediction query failed."
                    );
                    info!(
                        record = %key,
                        "Retrying in {:.1} seconds...",
                        self.policy.delay.as_secs_f64()
                    );
                    pause(self.policy.delay);
                }
                Attempt::Transient(e) => {
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts permitted".to_string());
        error!(
            record = %key,
            max_retries = max,
            last_error = %reason,
            "Max retries reached. Failing this sequence."
        );
        Outcome::PermanentFailure {
            attempts: max,
            reason,
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::DelayRange;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Reply = Result<Option<PredictionTable>, ServiceError>;

    struct ScriptedService {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
    }

    impl ScriptedService {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PredictionService for ScriptedService {
        fn predict(&self, _request: &PredictionRequest) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::Transport("script exhausted".into())))
        }
    }

    fn policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::ZERO,
            jitter: DelayRange::ZERO,
        }
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            residues: "ACDAAA".into(),
            allele_set: "H2-IAb".into(),
            method: "nn_align-2.3".into(),
        }
    }

    fn rows() -> PredictionTable {
        PredictionTable::new(
            vec!["allele".into(), "ic50".into()],
            vec![vec!["H2-IAb".into(), "10".into()]],
        )
    }

    fn no_rows() -> PredictionTable {
        PredictionTable::new(vec!["allele".into(), "ic50".into()], vec![])
    }

    #[test]
    fn success_on_first_attempt_stops_immediately() {
        let service = ScriptedService::new(vec![Ok(Some(rows()))]);
        let policy = policy(5);
        let outcome = RetryingClient::new(&service, &policy).submit(&request(), "P1");

        assert_eq!(outcome, Outcome::Success(rows()));
        assert_eq!(service.calls(), 1);
    }

    #[test]
    fn empty_result_is_terminal_and_not_retried() {
        let service = ScriptedService::new(vec![Ok(Some(no_rows())), Ok(Some(rows()))]);
        let policy = policy(5);
        let outcome = RetryingClient::new(&service, &policy).submit(&request(), "P1");

        assert_eq!(outcome, Outcome::Empty(no_rows()));
        assert_eq!(service.calls(), 1);
    }

    #[test]
    fn transient_errors_are_retried_until_success() {
        let service = ScriptedService::new(vec![
            Err(ServiceError::Transport("timeout".into())),
            Err(ServiceError::Status {
                status: 502,
                body: String::new(),
            }),
            Ok(Some(rows())),
        ]);
        let policy = policy(5);
        let outcome = RetryingClient::new(&service, &policy).submit(&request(), "P1");

        assert_eq!(outcome, Outcome::Success(rows()));
        assert_eq!(service.calls(), 3);
    }

    #[test]
    fn absent_payload_is_treated_as_transient() {
        let service = ScriptedService::new(vec![Ok(None), Ok(Some(rows()))]);
        let policy = policy(3);
        let outcome = RetryingClient::new(&service, &policy).submit(&request(), "P1");

        assert_eq!(outcome, Outcome::Success(rows()));
        assert_eq!(service.calls(), 2);
    }

    #[test]
    fn always_failing_service_exhausts_exactly_max_retries() {
        let service = ScriptedService::new(vec![]);
        let policy = policy(4);
        let outcome = RetryingClient::new(&service, &policy).submit(&request(), "P1");

        match outcome {
            Outcome::PermanentFailure { attempts, reason } => {
                assert_eq!(attempts, 4);
                assert!(reason.contains("script exhausted"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(service.calls(), 4);
    }

    #[test]
    fn persistent_absent_payload_ends_in_permanent_failure() {
        let service = ScriptedService::new(vec![Ok(None), Ok(None)]);
        let policy = policy(2);
        let outcome = RetryingClient::new(&service, &policy).submit(&request(), "P1");

        assert!(outcome.is_failure());
        assert_eq!(service.calls(), 2);
    }

    #[test]
    fn retry_delay_is_applied_between_attempts() {
        let service = ScriptedService::new(vec![
            Err(ServiceError::Transport("x".into())),
            Ok(Some(rows())),
        ]);
        let policy = RetryPolicy {
            max_retries: 2,
            delay: Duration::from_millis(50),
            jitter: DelayRange::ZERO,
        };

        let start = std::time::Instant::now();
        let outcome = RetryingClient::new(&service, &policy).submit(&request(), "P1");

        assert!(!outcome.is_failure());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
