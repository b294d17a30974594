//! Retry executor - runs a unit of work in a transaction, retrying on conflict
//!
//! Each attempt:
//! 1. Opens a fresh transaction
//! 2. Runs the unit of work against it
//! 3. Commits on success, rolls back on any error
//!
//! Only `Error::RetryableConflict` (from the work or from the commit) leads to
//! another attempt. Attempts are bounded by `RetryPolicy::max_attempts` and,
//! optionally, by a total elapsed-time budget.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, warn};

use super::context::RunContext;
use crate::domain::result::{Error, Result};
use crate::ports::{StoreTransaction, TransactionalStore};

/// Bounds and backoff curve for the retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
    /// Optional cap on wall-clock time spent across all attempts
    pub max_elapsed: Option<Duration>,
    /// Randomise delays to spread out competing clients
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
            max_elapsed: None,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Check the policy describes a finite, non-zero, capped backoff
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config("retry max_attempts must be at least 1"));
        }
        if self.initial_backoff.is_zero() {
            return Err(Error::config("retry initial backoff must be non-zero"));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(Error::config(
                "retry max backoff must not be below the initial backoff",
            ));
        }
        Ok(())
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self)
    }
}

/// Exponential backoff sequence for one run.
///
/// Delays double from `initial_backoff` up to `max_backoff`. With jitter on,
/// each delay is drawn from the upper half of the current step, then raised to
/// at least the previous delay so the sequence never shrinks.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_base: Duration,
    max: Duration,
    jitter: bool,
    last: Duration,
}

impl Backoff {
    fn new(policy: &RetryPolicy) -> Self {
        Self {
            next_base: policy.initial_backoff,
            max: policy.max_backoff,
            jitter: policy.jitter,
            last: Duration::ZERO,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let base = self.next_base.min(self.max);
        self.next_base = base.saturating_mul(2).min(self.max);

        let delay = if self.jitter {
            let floor = base - base / 2;
            let spread = rand::thread_rng().gen_range(0..=(base / 2).as_nanos() as u64);
            floor + Duration::from_nanos(spread)
        } else {
            base
        };

        let delay = delay.max(self.last).min(self.max);
        self.last = delay;
        delay
    }
}

/// Runs units of work with transparent conflict retry.
///
/// Holds no state between calls, so one executor can be shared by any number
/// of threads.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `work` inside a transaction on `store`.
    ///
    /// `work` may be called more than once; only the attempt that commits has
    /// an effect on the store. Returns the value of that attempt.
    pub fn run<S, T, F>(&self, store: &S, ctx: &RunContext, mut work: F) -> Result<T>
    where
        S: TransactionalStore + ?Sized,
        F: FnMut(&S::Transaction) -> Result<T>,
    {
        let started = Instant::now();
        let mut backoff = self.policy.backoff();
        let mut attempt: u32 = 0;

        loop {
            ctx.check()?;
            attempt += 1;
            debug!(attempt, "starting transaction attempt");

            let err = match Self::attempt(store, ctx, &mut work) {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "transaction committed after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => err,
                Err(err) => {
                    debug!(attempt, error = %err, "transaction failed with terminal error");
                    return Err(err);
                }
            };

            let delay = backoff.next_delay();
            let over_budget = self
                .policy
                .max_elapsed
                .is_some_and(|budget| started.elapsed() + delay > budget);

            if attempt >= self.policy.max_attempts || over_budget {
                warn!(
                    attempts = attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "retry budget exhausted"
                );
                return Err(Error::RetryExhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }

            warn!(
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transaction conflict, retrying"
            );
            ctx.sleep(delay)?;
        }
    }

    fn attempt<S, T, F>(store: &S, ctx: &RunContext, work: &mut F) -> Result<T>
    where
        S: TransactionalStore + ?Sized,
        F: FnMut(&S::Transaction) -> Result<T>,
    {
        let tx = store.begin()?;

        let value = match work(&tx) {
            Ok(value) => value,
            Err(err) => {
                rollback_quietly(tx);
                return Err(err);
            }
        };

        // Never commit once the caller has given up
        if let Err(err) = ctx.check() {
            rollback_quietly(tx);
            return Err(err);
        }

        tx.commit()?;
        Ok(value)
    }
}

fn rollback_quietly<T: StoreTransaction>(tx: T) {
    if let Err(e) = tx.rollback() {
        // The store may already have aborted the transaction
        debug!(error = %e, "rollback after failed attempt");
    }
}
