//! Synchronous retry call.
//!
//! A [`Call`] owns one fallible operation plus the policy deciding whether a failure earns
//! another attempt.
//!
//! Semantics:
//! - `max_retry` counts additional attempts beyond the first (total attempts = `1 + max_retry`).
//! - A failure is retried only while budget remains and the `is_retryable` predicate (if any)
//!   accepts it. An unset predicate accepts every failure.
//! - `on_retry` runs once per retry, after the failing attempt and before the next one. It never
//!   runs before the first attempt.
//! - The error returned is the one produced by the last attempt, unchanged. Earlier failures are
//!   dropped.
//!
//! Invariants:
//! - Attempts never exceed `1 + max_retry`.
//! - The budget is local to each [`Call::run`]; the configured `max_retry` is never mutated, so
//!   running a call twice gives each run the full budget.
//!
//! Example
//! ```rust
//! use retry_call::Call;
//!
//! let mut attempts = 0;
//! let mut retries = 0;
//! let result = Call::new(|| {
//!     attempts += 1;
//!     if attempts < 3 { Err("busy") } else { Ok(attempts) }
//! })
//! .max_retry(2)
//! .on_retry(|| retries += 1)
//! .run();
//!
//! assert_eq!(result, Ok(3));
//! assert_eq!(retries, 2);
//! ```

use std::fmt;

type Operation<'a, T, E> = Box<dyn FnMut() -> Result<T, E> + 'a>;
type Predicate<'a, E> = Box<dyn Fn(&E) -> bool + 'a>;
type Hook<'a> = Box<dyn FnMut() + 'a>;

/// A fallible operation bundled with its retry policy.
pub struct Call<'a, T, E> {
    operation: Operation<'a, T, E>,
    is_retryable: Option<Predicate<'a, E>>,
    on_retry: Option<Hook<'a>>,
    max_retry: usize,
}

impl<T, E> fmt::Debug for Call<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("max_retry", &self.max_retry)
            .field("operation", &"<operation>")
            .field("is_retryable", &self.is_retryable.as_ref().map(|_| "<predicate>"))
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl<'a, T, E> Call<'a, T, E> {
    /// Wrap `operation` with no retries, no predicate and no hook.
    pub fn new<Op>(operation: Op) -> Self
    where
        Op: FnMut() -> Result<T, E> + 'a,
    {
        Self { operation: Box::new(operation), is_retryable: None, on_retry: None, max_retry: 0 }
    }

    /// Set how many additional attempts may follow the first one.
    pub fn max_retry(mut self, max_retry: usize) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// Predicate deciding whether a failure is worth another attempt.
    pub fn is_retryable<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + 'a,
    {
        self.is_retryable = Some(Box::new(predicate));
        self
    }

    /// Hook invoked right before each retry, typically used to wait.
    pub fn on_retry<H>(mut self, hook: H) -> Self
    where
        H: FnMut() + 'a,
    {
        self.on_retry = Some(Box::new(hook));
        self
    }

    /// Configured retry budget.
    pub fn max_retry_budget(&self) -> usize {
        self.max_retry
    }

    /// Run the operation until it succeeds, fails with a non-retryable error, or the budget is
    /// spent. Returns the last attempt's result as-is.
    pub fn run(&mut self) -> Result<T, E> {
        let mut remaining = self.max_retry;
        let mut attempt = 1usize;

        loop {
            let err = match (self.operation)() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if remaining == 0 {
                if self.max_retry > 0 {
                    tracing::debug!(attempts = attempt, "retry budget exhausted");
                }
                return Err(err);
            }

            let retryable = match &self.is_retryable {
                Some(predicate) => predicate(&err),
                None => true,
            };
            if !retryable {
                tracing::trace!(attempt, "failure is not retryable");
                return Err(err);
            }

            remaining -= 1;
            attempt += 1;
            tracing::debug!(attempt, remaining, "retrying call");

            if let Some(hook) = self.on_retry.as_mut() {
                hook();
            }
        }
    }
}

/// Turn any fallible closure into a [`Call`].
///
/// ```rust
/// use retry_call::CallExt;
///
/// let mut n = 0;
/// let result = (|| { n += 1; Err::<u32, _>("nope") }).retrying(2).run();
/// assert_eq!(result, Err("nope"));
/// ```
pub trait CallExt<'a, T, E>: FnMut() -> Result<T, E> + Sized + 'a {
    /// Build a [`Call`] allowing `max_retry` additional attempts.
    fn retrying(self, max_retry: usize) -> Call<'a, T, E> {
        Call::new(self).max_retry(max_retry)
    }
}

impl<'a, T, E, F> CallExt<'a, T, E> for F where F: FnMut() -> Result<T, E> + 'a {}
