//! Schedule-driven retries.
//!
//! [`Retry`] runs an effect and, on failure, pulls the next delay from a
//! [`Schedule`]. A delay means "wait, then run again"; an exhausted schedule
//! ends the run with the last error. Every run of a `Retry` starts a fresh
//! pull, so the same value can be run repeatedly with identical pacing.
//!
//! Cancellation is terminal: a cancellation-class failure is never retried,
//! and cancellation during a wait ends the run with `E::cancelled()`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use undertow::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let attempts = Arc::new(AtomicU32::new(0));
//! let counter = attempts.clone();
//! let flaky = from_fn(move |_: &()| {
//!     if counter.fetch_add(1, Ordering::SeqCst) < 2 {
//!         Err(Error::expected(503, "unavailable"))
//!     } else {
//!         Ok("connected")
//!     }
//! });
//!
//! let result = flaky.retry(Schedule::recurs(5)).run(&()).await;
//! assert_eq!(result, Ok("connected"));
//! assert_eq!(attempts.load(Ordering::SeqCst), 3);
//! # });
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::effect::guard::{call, wait};
use crate::effect::trait_def::Effect;
use crate::error::Fault;
use crate::predicate::Predicate;
use crate::schedule::Schedule;

/// Where a schedule-driven run stands after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// An attempt is in progress.
    Running,
    /// Waiting this long before the next attempt.
    Waiting(Duration),
    /// The run ended with a success.
    Succeeded,
    /// The run ended with a failure that is not retried.
    Failed,
    /// The schedule ran out; the run ended with the last failure.
    Exhausted,
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before next attempt (if retrying).
    pub next_delay: Option<Duration>,
    /// Total elapsed time since first attempt.
    pub elapsed: Duration,
    /// What happens next.
    pub state: RetryState,
}

/// The hook used when none is installed.
pub type NoHook<E> = fn(&RetryEvent<'_, E>);

pub(crate) fn no_hook<E>(_: &RetryEvent<'_, E>) {}

/// Retries an effect according to a schedule.
///
/// Created by [`EffectExt::retry`](crate::effect::EffectExt::retry) and its
/// variants.
pub struct Retry<Inner, P, H> {
    pub(crate) inner: Inner,
    pub(crate) schedule: Schedule,
    pub(crate) predicate: P,
    pub(crate) hook: H,
}

impl<Inner, P, H> std::fmt::Debug for Retry<Inner, P, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retry")
            .field("inner", &"<effect>")
            .field("schedule", &self.schedule)
            .field("predicate", &"<predicate>")
            .field("hook", &"<function>")
            .finish()
    }
}

impl<Inner, P, H> Retry<Inner, P, H> {
    pub(crate) fn new(inner: Inner, schedule: Schedule, predicate: P, hook: H) -> Self {
        Retry {
            inner,
            schedule,
            predicate,
            hook,
        }
    }

    /// Install a hook called after every failed attempt.
    ///
    /// Useful for logging and metrics:
    ///
    /// ```rust
    /// use std::sync::{Arc, Mutex};
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let log = seen.clone();
    /// let effect = fail::<(), _, ()>(Error::new("down"))
    ///     .retry(Schedule::recurs(2))
    ///     .with_hook(move |event: &RetryEvent<'_, Error>| {
    ///         log.lock().unwrap().push(event.state);
    ///     });
    ///
    /// assert!(effect.run(&()).await.is_err());
    /// assert_eq!(
    ///     *seen.lock().unwrap(),
    ///     vec![
    ///         RetryState::Waiting(std::time::Duration::ZERO),
    ///         RetryState::Waiting(std::time::Duration::ZERO),
    ///         RetryState::Exhausted,
    ///     ]
    /// );
    /// # });
    /// ```
    pub fn with_hook<H2>(self, hook: H2) -> Retry<Inner, P, H2> {
        Retry {
            inner: self.inner,
            schedule: self.schedule,
            predicate: self.predicate,
            hook,
        }
    }
}

impl<Inner, P, H> Effect for Retry<Inner, P, H>
where
    Inner: Effect,
    Inner::Error: Fault,
    P: Predicate<Inner::Error>,
    H: Fn(&RetryEvent<'_, Inner::Error>) + Send + Sync,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let start = Instant::now();
        let mut delays = self.schedule.iter();
        let mut attempt = 0u32;

        loop {
            attempt = attempt.saturating_add(1);
            #[cfg(feature = "tracing")]
            tracing::trace!(attempt, state = ?RetryState::Running);

            let error = match self.inner.run(env).await {
                Ok(value) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(attempt, state = ?RetryState::Succeeded);
                    return Ok(value);
                }
                Err(error) => error,
            };

            let retryable =
                !error.is_cancelled() && call::<Self::Error, _>(|| self.predicate.check(&error))?;
            let next_delay = if retryable { delays.next() } else { None };
            let state = match (retryable, next_delay) {
                (false, _) => RetryState::Failed,
                (true, Some(delay)) => RetryState::Waiting(delay),
                (true, None) => RetryState::Exhausted,
            };

            {
                let event = RetryEvent {
                    attempt,
                    error: &error,
                    next_delay,
                    elapsed: start.elapsed(),
                    state,
                };
                call::<Self::Error, _>(|| (self.hook)(&event))?;
            }

            let Some(delay) = next_delay else {
                #[cfg(feature = "tracing")]
                if state == RetryState::Exhausted {
                    tracing::warn!(attempt, "retry schedule exhausted");
                }
                return Err(error);
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, ?delay, "attempt failed, retrying");

            if !wait(env, delay).await {
                return Err(Fault::cancelled());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::prelude::*;
    use crate::env::Runtime;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn counting_failure(
        runs: Arc<AtomicU32>,
        error: Error,
    ) -> impl Effect<Output = (), Error = Error, Env = Runtime> {
        from_fn(move |_: &Runtime| -> Result<(), Error> {
            runs.fetch_add(1, Ordering::SeqCst);
            Err(error.clone())
        })
    }

    #[tokio::test]
    async fn test_recurs_three_runs_four_times() {
        let runs = Arc::new(AtomicU32::new(0));
        let effect = counting_failure(runs.clone(), Error::new("boom")).retry(Schedule::recurs(3));
        assert_eq!(effect.run(&Runtime::new()).await, Err(Error::new("boom")));
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_schedule_runs_once() {
        let runs = Arc::new(AtomicU32::new(0));
        let effect = counting_failure(runs.clone(), Error::new("boom")).retry(Schedule::never());
        assert!(effect.run(&Runtime::new()).await.is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_is_never_retried() {
        let runs = Arc::new(AtomicU32::new(0));
        let effect = counting_failure(runs.clone(), Error::cancelled()).retry(Schedule::forever());
        assert_eq!(effect.run(&Runtime::new()).await, Err(Error::cancelled()));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_while_stops_on_rejected_error() {
        let runs = Arc::new(AtomicU32::new(0));
        let effect = counting_failure(runs.clone(), Error::expected(400, "bad request"))
            .retry_while(Schedule::forever(), |e: &Error| e.code() >= 500);
        assert!(effect.run(&Runtime::new()).await.is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_until_stops_once_predicate_holds() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let effect = from_fn(move |_: &()| -> Result<(), Error> {
            let n = counter.fetch_add(1, Ordering::SeqCst) as i32;
            Err(Error::expected(n, "attempt"))
        })
        .retry_until(Schedule::forever(), |e: &Error| e.code() == 2);
        assert_eq!(effect.run(&()).await.unwrap_err().code(), 2);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_wait_is_terminal() {
        let rt = Runtime::new();
        let runs = Arc::new(AtomicU32::new(0));
        let effect = counting_failure(runs.clone(), Error::new("down"))
            .retry(Schedule::spaced(Duration::from_secs(60)));

        let trigger = rt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(90)).await;
            trigger.cancel();
        });

        assert_eq!(effect.run(&rt).await, Err(Error::cancelled()));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hook_sees_schedule_delays() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let log = events.clone();
        let effect = fail::<(), _, ()>(Error::new("x")).retry_with_hooks(
            Schedule::exponential(Duration::from_millis(10), 2.0).take(3),
            move |event: &RetryEvent<'_, Error>| {
                log.lock().unwrap().push((event.attempt, event.next_delay));
            },
        );
        assert!(effect.run(&()).await.is_err());
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                (1, Some(Duration::from_millis(10))),
                (2, Some(Duration::from_millis(20))),
                (3, Some(Duration::from_millis(40))),
                (4, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_rerunning_restarts_the_schedule() {
        let runs = Arc::new(AtomicU32::new(0));
        let effect = counting_failure(runs.clone(), Error::new("x")).retry(Schedule::recurs(1));
        let _ = effect.run(&Runtime::new()).await;
        let _ = effect.run(&Runtime::new()).await;
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }
}
