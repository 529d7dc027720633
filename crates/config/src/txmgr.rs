use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default interval between batcher ticks.
const DEFAULT_BATCH_INTERVAL_MS: u64 = 60_000;

/// Default minimum number of pointer candidates that triggers a flush.
const DEFAULT_MIN_BATCH_SIZE: usize = 3;

/// Default upper bound on how long a pointer candidate may stay buffered.
const DEFAULT_MAX_BATCH_WAIT_MS: u64 = 600_000;

/// Default delay between dispatches within one flush.
const DEFAULT_FLUSH_STAGGER_MS: u64 = 100;

/// Default wait before reporting a saturated DA admission.
const DEFAULT_SATURATION_BACKOFF_MS: u64 = 60_000;

/// Default wait before reporting a failed DA server store.
const DEFAULT_STORE_FAILURE_BACKOFF_MS: u64 = 60_000;

/// Default DA-chain depth a two-step anchor must reach before its pointer is committed.
const DEFAULT_FORK_SAFE_DEPTH: u64 = 375;

/// Default DA-chain head polling interval.
const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 1_000;

/// Default bound on the whole confirmation wait (4 hours).
const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 4 * 60 * 60 * 1_000;

/// Shortest timer period handed to the runtime.
const MIN_PERIOD_MS: u64 = 1;

/// Rejected submission queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueConfigError {
    #[error("{0} must be greater than zero")]
    ZeroPeriod(&'static str),
}

/// Submission queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Max number of concurrent direct L1 sends. 0 means no limit.
    #[serde(default)]
    pub max_pending: u64,

    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    #[serde(default = "default_min_batch_size")]
    pub min_batch_size: usize,

    /// Buffered pointers older than this are flushed even below `min_batch_size`.
    #[serde(default = "default_max_batch_wait_ms")]
    pub max_batch_wait_ms: u64,

    #[serde(default = "default_flush_stagger_ms")]
    pub flush_stagger_ms: u64,

    #[serde(default = "default_saturation_backoff_ms")]
    pub saturation_backoff_ms: u64,

    #[serde(default = "default_store_failure_backoff_ms")]
    pub store_failure_backoff_ms: u64,

    #[serde(default = "default_fork_safe_depth")]
    pub fork_safe_depth: u64,

    #[serde(default = "default_confirmation_poll_interval_ms")]
    pub confirmation_poll_interval_ms: u64,

    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
}

fn default_batch_interval_ms() -> u64 {
    DEFAULT_BATCH_INTERVAL_MS
}

fn default_min_batch_size() -> usize {
    DEFAULT_MIN_BATCH_SIZE
}

fn default_max_batch_wait_ms() -> u64 {
    DEFAULT_MAX_BATCH_WAIT_MS
}

fn default_flush_stagger_ms() -> u64 {
    DEFAULT_FLUSH_STAGGER_MS
}

fn default_saturation_backoff_ms() -> u64 {
    DEFAULT_SATURATION_BACKOFF_MS
}

fn default_store_failure_backoff_ms() -> u64 {
    DEFAULT_STORE_FAILURE_BACKOFF_MS
}

fn default_fork_safe_depth() -> u64 {
    DEFAULT_FORK_SAFE_DEPTH
}

fn default_confirmation_poll_interval_ms() -> u64 {
    DEFAULT_CONFIRMATION_POLL_INTERVAL_MS
}

fn default_confirmation_timeout_ms() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_MS
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_pending: 0,
            batch_interval_ms: DEFAULT_BATCH_INTERVAL_MS,
            min_batch_size: DEFAULT_MIN_BATCH_SIZE,
            max_batch_wait_ms: DEFAULT_MAX_BATCH_WAIT_MS,
            flush_stagger_ms: DEFAULT_FLUSH_STAGGER_MS,
            saturation_backoff_ms: DEFAULT_SATURATION_BACKOFF_MS,
            store_failure_backoff_ms: DEFAULT_STORE_FAILURE_BACKOFF_MS,
            fork_safe_depth: DEFAULT_FORK_SAFE_DEPTH,
            confirmation_poll_interval_ms: DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
            confirmation_timeout_ms: DEFAULT_CONFIRMATION_TIMEOUT_MS,
        }
    }
}

impl QueueConfig {
    pub fn with_max_pending(mut self, max_pending: u64) -> Self {
        self.max_pending = max_pending;
        self
    }

    pub fn with_min_batch_size(mut self, min_batch_size: usize) -> Self {
        self.min_batch_size = min_batch_size;
        self
    }

    pub fn with_fork_safe_depth(mut self, fork_safe_depth: u64) -> Self {
        self.fork_safe_depth = fork_safe_depth;
        self
    }

    /// Rejects values the queue cannot run with.
    pub fn validate(&self) -> Result<(), QueueConfigError> {
        if self.batch_interval_ms == 0 {
            return Err(QueueConfigError::ZeroPeriod("batch_interval_ms"));
        }
        if self.confirmation_poll_interval_ms == 0 {
            return Err(QueueConfigError::ZeroPeriod("confirmation_poll_interval_ms"));
        }
        Ok(())
    }

    /// Direct-send limit, `None` when unbounded.
    pub fn max_pending(&self) -> Option<usize> {
        match self.max_pending {
            0 => None,
            n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    /// Batcher tick period. Never zero, even for an unvalidated config.
    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms.max(MIN_PERIOD_MS))
    }

    pub fn max_batch_wait(&self) -> Duration {
        Duration::from_millis(self.max_batch_wait_ms)
    }

    pub fn flush_stagger(&self) -> Duration {
        Duration::from_millis(self.flush_stagger_ms)
    }

    pub fn saturation_backoff(&self) -> Duration {
        Duration::from_millis(self.saturation_backoff_ms)
    }

    pub fn store_failure_backoff(&self) -> Duration {
        Duration::from_millis(self.store_failure_backoff_ms)
    }

    /// DA head polling period. Never zero, even for an unvalidated config.
    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms.max(MIN_PERIOD_MS))
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}
