//! Run context - cancellation and deadlines for a unit of work

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::result::{Error, Result};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    cond: Condvar,
}

/// Cloneable cancellation signal.
///
/// All clones share one flag. Waiting on the token blocks on a condition
/// variable and wakes as soon as any clone calls [`CancelToken::cancel`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.state.cond.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`. Returns `true` if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .state
            .cond
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Execution limits for one call into the retry executor
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl RunContext {
    /// No deadline, never cancelled unless a token is attached
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_at(Instant::now() + timeout)
    }

    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Time left before the deadline, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail with `Cancelled` or `DeadlineExceeded` if the run must stop.
    /// Cancellation wins when both apply.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Wait for `delay`, waking early on cancellation or at the deadline
    pub fn sleep(&self, delay: Duration) -> Result<()> {
        let wait = match self.remaining() {
            Some(remaining) => delay.min(remaining),
            None => delay,
        };
        if self.cancel.wait_timeout(wait) {
            return Err(Error::Cancelled);
        }
        self.check()
    }
}
