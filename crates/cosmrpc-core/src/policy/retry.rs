//! Endpoint-rotating retry engine.
//!
//! One call runs as a small state machine:
//!
//! ```text
//! Attempt ──ok──────────────────────────────▶ Done(ok)
//!    │ transient                 ▲
//!    ▼                           │ limit reached
//! Backoff ─rotate, sleep─▶ Attempt
//!    │ business
//!    ▼
//! Sweep(2×N) ─ rotate, try each ─▶ Done(first ok | last business error)
//! ```
//!
//! Transient faults get patient retries with rotation and a fixed backoff,
//! bounded by `retry_limit`. A business fault triggers a single sweep across
//! the pool since a lagging node can serve a stale view. During the sweep a
//! later business error replaces an earlier one; transient errors never do.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::classify::{is_transient, Classify};
use crate::error::RetryError;
use crate::pool::EndpointPool;

/// Configuration for the retry engine.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of outer attempts under sustained transient failure.
    pub retry_limit: u32,
    /// Delay after each transient failure.
    pub backoff: Duration,
    /// Sweep length as a multiple of the pool size.
    pub sweep_factor: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_limit: 600,
            backoff: Duration::from_secs(2),
            sweep_factor: 2,
        }
    }
}

enum Step<T, E> {
    Attempt,
    Backoff(E),
    Sweep { remaining: usize, candidate: E },
    Done(Result<T, RetryError<E>>),
}

/// Runs operations against a pool, rotating on failure.
#[derive(Debug)]
pub struct RetryEngine<'a, N> {
    pool: &'a EndpointPool<N>,
    config: &'a RetryConfig,
}

impl<'a, N: Clone> RetryEngine<'a, N> {
    pub fn new(pool: &'a EndpointPool<N>, config: &'a RetryConfig) -> Self {
        Self { pool, config }
    }

    /// Execute `op`, handing it the current endpoint on every attempt.
    pub async fn execute<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(N) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        let limit = self.config.retry_limit.max(1);
        let mut attempts = 0u32;
        let mut step = Step::Attempt;

        loop {
            step = match step {
                Step::Attempt => {
                    attempts += 1;
                    match op(self.pool.current()).await {
                        Ok(value) => Step::Done(Ok(value)),
                        Err(e) => {
                            tracing::debug!(
                                endpoint = self.pool.current_index(),
                                attempt = attempts,
                                error = %e,
                                "rpc attempt failed"
                            );
                            if is_transient(&e) {
                                Step::Backoff(e)
                            } else {
                                Step::Sweep {
                                    remaining: self.pool.len() * self.config.sweep_factor,
                                    candidate: e,
                                }
                            }
                        }
                    }
                }
                Step::Backoff(last) => {
                    let failed = self.pool.current_index();
                    self.pool.rotate();
                    if attempts >= limit {
                        tracing::warn!(attempts, error = %last, "retry limit reached");
                        Step::Done(Err(RetryError::LimitExceeded { attempts, last }))
                    } else {
                        tracing::warn!(
                            endpoint = failed,
                            next = self.pool.current_index(),
                            attempt = attempts,
                            backoff_ms = self.config.backoff.as_millis() as u64,
                            error = %last,
                            "transient failure, rotating endpoint"
                        );
                        tokio::time::sleep(self.config.backoff).await;
                        Step::Attempt
                    }
                }
                Step::Sweep { remaining: 0, candidate } => Step::Done(Err(RetryError::Failed(candidate))),
                Step::Sweep { remaining, candidate } => {
                    self.pool.rotate();
                    match op(self.pool.current()).await {
                        Ok(value) => Step::Done(Ok(value)),
                        Err(e) => {
                            tracing::debug!(
                                endpoint = self.pool.current_index(),
                                remaining,
                                error = %e,
                                "sweep attempt failed"
                            );
                            let candidate = if is_transient(&e) { candidate } else { e };
                            Step::Sweep {
                                remaining: remaining - 1,
                                candidate,
                            }
                        }
                    }
                }
                Step::Done(outcome) => return outcome,
            };
        }
    }
}
