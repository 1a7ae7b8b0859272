use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::core::normalize::NormalizeError;
use crate::models::responses::{BatchSummaryResponse, ItemError};
use crate::services::{InferenceError, StoreError};

/// Any failure one evaluation item can produce
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Malformed(#[from] NormalizeError),
}

impl EvalError {
    /// True when continuing the batch would only accumulate more failures
    pub fn is_batch_fatal(&self) -> bool {
        match self {
            EvalError::Inference(e) => e.is_fatal(),
            _ => false,
        }
    }
}

/// Per-item failure recorded in the batch aggregate
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub subject_id: String,
    pub message: String,
}

/// Aggregate outcome of one batch run
///
/// Outcomes live only in this struct and in the results already persisted;
/// the batch run itself is never stored.
#[derive(Debug)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub errors: Vec<ItemFailure>,
    /// Set when the batch aborted early; also present in `errors` under the
    /// item that triggered it.
    pub fatal: Option<EvalError>,
}

impl BatchOutcome {
    /// Per-item failures are data, not protocol errors: the batch reports
    /// success unless nothing succeeded (or a fatal condition hit an empty run).
    pub fn is_success(&self) -> bool {
        self.succeeded > 0 || (self.total == 0 && self.fatal.is_none())
    }

    pub fn into_summary(self) -> BatchSummaryResponse {
        BatchSummaryResponse {
            success: self.is_success(),
            total: self.total,
            succeeded: self.succeeded,
            errors: self
                .errors
                .into_iter()
                .map(|e| ItemError {
                    subject_id: e.subject_id,
                    message: e.message,
                })
                .collect(),
            fatal_error: self.fatal.map(|e| e.to_string()),
        }
    }
}

/// Number of waves a batch of `total` items needs at the given wave size
pub fn wave_count(total: usize, concurrency: usize) -> usize {
    total.div_ceil(concurrency.max(1))
}

/// Drives evaluation items through fixed-size concurrent waves
///
/// Within a wave all items run concurrently; between waves a pacing delay is
/// inserted to respect the scoring service's rate limits. This delay is the
/// system's only explicit backpressure mechanism.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    concurrency: usize,
    pacing: Duration,
}

impl BatchRunner {
    pub fn new(concurrency: usize, pacing: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            pacing,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(5, Duration::from_secs(1))
    }

    /// Process `(subject_id, unit)` pairs in waves
    ///
    /// Each item's failure is caught and recorded; it never aborts the wave.
    /// A batch-fatal failure stops scheduling further waves, but the wave it
    /// occurred in is always joined to completion first so in-flight writes
    /// are not cut off halfway.
    pub async fn run<T, F, Fut>(&self, units: Vec<(String, T)>, op: F) -> BatchOutcome
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<(), EvalError>> + Send + 'static,
    {
        let total = units.len();
        let run_id = uuid::Uuid::new_v4();
        let waves = wave_count(total, self.concurrency);

        tracing::info!(
            "Batch run {}: {} items in {} waves of up to {}",
            run_id,
            total,
            waves,
            self.concurrency
        );

        let mut succeeded = 0usize;
        let mut errors: Vec<ItemFailure> = Vec::new();
        let mut fatal: Option<EvalError> = None;

        let mut remaining = units.into_iter();
        let mut wave_index = 0usize;

        loop {
            let wave: Vec<(String, T)> = remaining.by_ref().take(self.concurrency).collect();
            if wave.is_empty() {
                break;
            }

            if wave_index > 0 {
                tokio::time::sleep(self.pacing).await;
            }

            let mut set = JoinSet::new();
            let mut task_subjects: HashMap<tokio::task::Id, String> = HashMap::new();
            for (subject_id, unit) in wave {
                let fut = op(unit);
                let task_subject = subject_id.clone();
                let handle = set.spawn(async move { (task_subject, fut.await) });
                task_subjects.insert(handle.id(), subject_id);
            }

            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => succeeded += 1,
                    Ok((subject_id, Err(e))) => {
                        tracing::warn!(
                            "Batch run {} wave {}: item {} failed: {}",
                            run_id,
                            wave_index,
                            subject_id,
                            e
                        );
                        errors.push(ItemFailure {
                            subject_id,
                            message: e.to_string(),
                        });
                        if e.is_batch_fatal() && fatal.is_none() {
                            fatal = Some(e);
                        }
                    }
                    Err(join_err) => {
                        let subject_id = task_subjects
                            .get(&join_err.id())
                            .cloned()
                            .unwrap_or_else(|| "unknown".to_string());
                        errors.push(ItemFailure {
                            subject_id,
                            message: format!("evaluation task panicked: {}", join_err),
                        });
                    }
                }
            }

            if fatal.is_some() {
                tracing::error!(
                    "Batch run {} aborted after wave {}: {}",
                    run_id,
                    wave_index,
                    fatal.as_ref().map(|e| e.to_string()).unwrap_or_default()
                );
                break;
            }

            wave_index += 1;
        }

        tracing::info!(
            "Batch run {} finished: {}/{} succeeded, {} errors",
            run_id,
            succeeded,
            total,
            errors.len()
        );

        BatchOutcome {
            total,
            succeeded,
            errors,
            fatal,
        }
    }
}
