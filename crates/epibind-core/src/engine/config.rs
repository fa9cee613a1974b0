use crate::core::io::layout::OutputLayout;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_METHOD: &str = "nn_align-2.3";
pub const DEFAULT_MAX_RETRIES: usize = 15;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_JITTER: DelayRange = DelayRange {
    min: Duration::from_secs(1),
    max: Duration::from_secs(6),
};
pub const DEFAULT_STAGGER: DelayRange = DelayRange {
    min: Duration::from_secs(1),
    max: Duration::from_secs(10),
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// An inclusive range from which a random pause is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn new(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidValue {
                parameter: "delay range",
                reason: format!("minimum {:?} exceeds maximum {:?}", min, max),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    /// Draws a duration uniformly from the range, at millisecond resolution.
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on the total number of attempts, not on re-tries after the first.
    pub max_retries: usize,
    /// Fixed pause after a failed attempt.
    pub delay: Duration,
    /// Random pause before every attempt.
    pub jitter: DelayRange,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
            jitter: DEFAULT_JITTER,
        }
    }
}

/// Process-wide configuration, built once and shared read-only by every task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub worker_count: usize,
    /// Label used in the results directory name and logs (e.g. the species).
    pub tag: String,
    pub allele_set: String,
    pub method: String,
    pub retry: RetryPolicy,
    /// Random pause before a task starts, spreading out worker start-up.
    pub stagger: DelayRange,
    pub layout: OutputLayout,
}

#[derive(Default)]
pub struct RunConfigBuilder {
    worker_count: Option<usize>,
    tag: Option<String>,
    allele_set: Option<String>,
    method: Option<String>,
    max_retries: Option<usize>,
    retry_delay: Option<Duration>,
    jitter: Option<DelayRange>,
    stagger: Option<DelayRange>,
    layout: Option<OutputLayout>,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn worker_count(mut self, n: usize) -> Self {
        self.worker_count = Some(n);
        self
    }
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
    pub fn allele_set(mut self, alleles: impl Into<String>) -> Self {
        self.allele_set = Some(alleles.into());
        self
    }
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
    pub fn max_retries(mut self, n: usize) -> Self {
        self.max_retries = Some(n);
        self
    }
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }
    pub fn jitter(mut self, range: DelayRange) -> Self {
        self.jitter = Some(range);
        self
    }
    pub fn stagger(mut self, range: DelayRange) -> Self {
        self.stagger = Some(range);
        self
    }
    pub fn layout(mut self, layout: OutputLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let worker_count = self.worker_count.unwrap_or(DEFAULT_WORKER_COUNT);
        if worker_count == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "worker_count",
                reason: "at least one worker is required".to_string(),
            });
        }

        let max_retries = self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_retries",
                reason: "at least one attempt is required".to_string(),
            });
        }

        let allele_set = self
            .allele_set
            .ok_or(ConfigError::MissingParameter("allele_set"))?;
        if allele_set.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "allele_set",
                reason: "allele set is empty".to_string(),
            });
        }

        let method = self.method.unwrap_or_else(|| DEFAULT_METHOD.to_string());
        if method.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "method",
                reason: "method name is empty".to_string(),
            });
        }

        Ok(RunConfig {
            worker_count,
            tag: self.tag.unwrap_or_else(|| "custom".to_string()),
            allele_set,
            method,
            retry: RetryPolicy {
                max_retries,
                delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
                jitter: self.jitter.unwrap_or(DEFAULT_JITTER),
            },
            stagger: self.stagger.unwrap_or(DEFAULT_STAGGER),
            layout: self.layout.ok_or(ConfigError::MissingParameter("layout"))?,
        })
    }
}
