//! Extension trait providing combinator methods for all effects.
//!
//! `EffectExt` is implemented for every [`Effect`]. Each method consumes the
//! effect and returns a new, still unexecuted, effect value.

use std::time::Duration;

use crate::effect::boxed::BoxedEffect;
use crate::effect::combinators::{AndThen, Filter, Map, MapErr, OrElse, Tap, Timeout, Zip, ZipWith};
use crate::effect::repeat::{Reduce, Repeat};
use crate::effect::retry::{no_hook, NoHook, Retry, RetryEvent};
use crate::effect::trait_def::Effect;
use crate::error::Fault;
use crate::predicate::{Always, Not, Predicate};
use crate::schedule::Schedule;

/// Extension trait providing combinator methods for all effects.
///
/// This trait is automatically implemented for all types that implement
/// `Effect`. You don't need to implement it yourself.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = pure::<_, Error, ()>(21)
///     .map(|x| x * 2)
///     .and_then(|x| pure(x + 1))
///     .map_err(|e| e.context("while computing"));
///
/// assert_eq!(effect.execute(&()).await, Ok(43));
/// # });
/// ```
pub trait EffectExt: Effect {
    /// Transform the success value.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> U + Send + Sync,
        U: Send,
    {
        Map { inner: self, f }
    }

    /// Transform the error value.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let effect = fail::<i32, _, ()>(Error::new("io"))
    ///     .map_err(|e| Error::expected(500, "upstream").with_inner(e));
    /// assert_eq!(effect.execute(&()).await.unwrap_err().code(), 500);
    /// # });
    /// ```
    fn map_err<E2, F>(self, f: F) -> MapErr<Self, F>
    where
        F: Fn(Self::Error) -> E2 + Send + Sync,
        E2: Fault,
    {
        MapErr { inner: self, f }
    }

    /// Chain a dependent effect.
    ///
    /// If this effect succeeds, `f` builds the next effect from its value.
    /// If it fails, the error propagates and `f` is never called.
    ///
    /// The chained effect must have the same error type. Use `map_err`
    /// to convert error types before chaining.
    fn and_then<E2, F>(self, f: F) -> AndThen<Self, F>
    where
        E2: Effect<Error = Self::Error, Env = Self::Env>,
        F: Fn(Self::Output) -> E2 + Send + Sync,
    {
        AndThen { inner: self, f }
    }

    /// Recover from any failure with another effect.
    ///
    /// For selective recovery see [`Fallible`](crate::effect::Fallible).
    fn or_else<E2, F>(self, f: F) -> OrElse<Self, F>
    where
        E2: Effect<Output = Self::Output, Env = Self::Env>,
        F: Fn(Self::Error) -> E2 + Send + Sync,
    {
        OrElse { inner: self, f }
    }

    /// Run a side effect on the success value, keeping the original value.
    ///
    /// A failure of the side effect fails the whole effect.
    fn tap<E2, F>(self, f: F) -> Tap<Self, F>
    where
        E2: Effect<Error = Self::Error, Env = Self::Env>,
        F: Fn(&Self::Output) -> E2 + Send + Sync,
    {
        Tap { inner: self, f }
    }

    /// Keep the success value only if `predicate` holds.
    ///
    /// A rejected value fails with `E::filtered()`, which belongs to the
    /// cancellation class and is never retried.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let even = pure::<_, Error, ()>(3).filter(|n| n % 2 == 0);
    /// assert!(even.execute(&()).await.unwrap_err().is_cancelled());
    /// # });
    /// ```
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        P: Fn(&Self::Output) -> bool + Send + Sync,
    {
        Filter {
            inner: self,
            predicate,
        }
    }

    /// Combine this effect with another, returning both results as a tuple.
    ///
    /// Both effects run concurrently. If only one fails, that failure is
    /// returned; if both fail, a cancellation wins, otherwise the left error.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let both = pure::<_, Error, ()>(1).zip(pure("one"));
    /// assert_eq!(both.execute(&()).await, Ok((1, "one")));
    /// # });
    /// ```
    fn zip<E2>(self, other: E2) -> Zip<Self, E2>
    where
        E2: Effect<Error = Self::Error, Env = Self::Env>,
    {
        Zip::new(self, other)
    }

    /// Combine this effect with another using a function.
    fn zip_with<E2, R, F>(self, other: E2, f: F) -> ZipWith<Self, E2, F>
    where
        E2: Effect<Error = Self::Error, Env = Self::Env>,
        F: Fn(Self::Output, E2::Output) -> R + Send + Sync,
        R: Send,
    {
        ZipWith::new(self, other, f)
    }

    /// Fail with `E::timed_out(duration)` if this effect takes longer than
    /// `duration`.
    fn timeout(self, duration: Duration) -> Timeout<Self> {
        Timeout {
            inner: self,
            duration,
        }
    }

    /// Erase the type of this effect.
    ///
    /// Needed to store differently built effects together, to return them
    /// from match arms, or to build effects recursively.
    fn boxed(self) -> BoxedEffect<Self::Output, Self::Error, Self::Env>
    where
        Self: 'static,
        Self::Output: 'static,
        Self::Error: 'static,
        Self::Env: 'static,
    {
        BoxedEffect::new(self)
    }

    /// Retry on failure, pacing attempts with `schedule`.
    ///
    /// The effect runs once, then once more for every delay the schedule
    /// yields while it keeps failing. `Schedule::recurs(3)` allows up to four
    /// runs. Cancellation-class failures are never retried.
    fn retry(self, schedule: Schedule) -> Retry<Self, Always, NoHook<Self::Error>> {
        Retry::new(self, schedule, Always, no_hook::<Self::Error> as NoHook<Self::Error>)
    }

    /// Retry while `predicate` holds for the failure.
    fn retry_while<P>(
        self,
        schedule: Schedule,
        predicate: P,
    ) -> Retry<Self, P, NoHook<Self::Error>>
    where
        P: Predicate<Self::Error>,
    {
        Retry::new(self, schedule, predicate, no_hook::<Self::Error> as NoHook<Self::Error>)
    }

    /// Retry until `predicate` holds for the failure.
    fn retry_until<P>(
        self,
        schedule: Schedule,
        predicate: P,
    ) -> Retry<Self, Not<P>, NoHook<Self::Error>>
    where
        P: Predicate<Self::Error>,
    {
        Retry::new(self, schedule, Not(predicate), no_hook::<Self::Error> as NoHook<Self::Error>)
    }

    /// Retry on failure, calling `hook` after every failed attempt.
    ///
    /// ```rust
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let failures = Arc::new(AtomicU32::new(0));
    /// let seen = failures.clone();
    /// let effect = fail::<(), _, ()>(Error::new("down")).retry_with_hooks(
    ///     Schedule::recurs(2),
    ///     move |_: &RetryEvent<'_, Error>| {
    ///         seen.fetch_add(1, Ordering::SeqCst);
    ///     },
    /// );
    ///
    /// assert!(effect.execute(&()).await.is_err());
    /// assert_eq!(failures.load(Ordering::SeqCst), 3);
    /// # });
    /// ```
    fn retry_with_hooks<H>(self, schedule: Schedule, hook: H) -> Retry<Self, Always, H>
    where
        H: Fn(&RetryEvent<'_, Self::Error>) + Send + Sync,
    {
        Retry::new(self, schedule, Always, hook)
    }

    /// Re-run on success, pacing runs with `schedule`.
    ///
    /// Returns the last success, or the first failure.
    fn repeat(self, schedule: Schedule) -> Repeat<Self, Always> {
        Repeat {
            inner: self,
            schedule,
            predicate: Always,
        }
    }

    /// Re-run while `predicate` holds for the success value.
    fn repeat_while<P>(self, schedule: Schedule, predicate: P) -> Repeat<Self, P>
    where
        P: Predicate<Self::Output>,
    {
        Repeat {
            inner: self,
            schedule,
            predicate,
        }
    }

    /// Re-run until `predicate` holds for the success value.
    fn repeat_until<P>(self, schedule: Schedule, predicate: P) -> Repeat<Self, Not<P>>
    where
        P: Predicate<Self::Output>,
    {
        Repeat {
            inner: self,
            schedule,
            predicate: Not(predicate),
        }
    }

    /// Re-run on success, folding every value into an accumulator.
    ///
    /// An ordinary failure ends the fold and the accumulator is returned as a
    /// success; a cancellation-class failure is reported.
    ///
    /// ```rust
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use std::sync::Arc;
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let next = Arc::new(AtomicI32::new(0));
    /// let reader = from_fn(move |_: &()| match next.fetch_add(1, Ordering::SeqCst) + 1 {
    ///     n if n <= 3 => Ok(n),
    ///     _ => Err(Error::new("end of input")),
    /// });
    ///
    /// let total = reader.reduce(Schedule::forever(), 0, |acc, n| acc + n);
    /// assert_eq!(total.execute(&()).await, Ok(6));
    /// # });
    /// ```
    fn reduce<A, F>(self, schedule: Schedule, seed: A, fold: F) -> Reduce<Self, A, F, Always>
    where
        A: Clone + Send + Sync,
        F: Fn(A, Self::Output) -> A + Send + Sync,
    {
        Reduce {
            inner: self,
            schedule,
            seed,
            fold,
            predicate: Always,
        }
    }

    /// Fold while `predicate` holds for the latest value.
    ///
    /// The value that fails the predicate is still folded in.
    fn reduce_while<A, F, P>(
        self,
        schedule: Schedule,
        seed: A,
        fold: F,
        predicate: P,
    ) -> Reduce<Self, A, F, P>
    where
        A: Clone + Send + Sync,
        F: Fn(A, Self::Output) -> A + Send + Sync,
        P: Predicate<Self::Output>,
    {
        Reduce {
            inner: self,
            schedule,
            seed,
            fold,
            predicate,
        }
    }

    /// Fold until `predicate` holds for the latest value.
    fn reduce_until<A, F, P>(
        self,
        schedule: Schedule,
        seed: A,
        fold: F,
        predicate: P,
    ) -> Reduce<Self, A, F, Not<P>>
    where
        A: Clone + Send + Sync,
        F: Fn(A, Self::Output) -> A + Send + Sync,
        P: Predicate<Self::Output>,
    {
        Reduce {
            inner: self,
            schedule,
            seed,
            fold,
            predicate: Not(predicate),
        }
    }

    /// Run and await the effect.
    #[allow(async_fn_in_trait)]
    async fn execute(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        self.run(env).await
    }

    /// Run against a default-constructed environment.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let effect = pure::<_, Error, Runtime>(42);
    /// assert_eq!(effect.run_standalone().await, Ok(42));
    /// # });
    /// ```
    #[allow(async_fn_in_trait)]
    async fn run_standalone(&self) -> Result<Self::Output, Self::Error>
    where
        Self::Env: Default,
    {
        let env = Self::Env::default();
        self.run(&env).await
    }

    /// Run to completion on a fresh current-thread runtime, blocking the
    /// calling thread.
    ///
    /// Calling it from inside a tokio runtime, or failing to build the
    /// runtime, is reported through the effect's error type as an
    /// [`io::Error`](std::io::Error) rather than a panic.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    ///
    /// let effect = pure::<_, Error, ()>(1).map(|n| n + 1);
    /// assert_eq!(effect.run_blocking(&()), Ok(2));
    /// ```
    fn run_blocking(&self, env: &Self::Env) -> Result<Self::Output, Self::Error>
    where
        Self::Error: From<std::io::Error>,
    {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(std::io::Error::other(
                "run_blocking called from within a tokio runtime; await `run` instead",
            )
            .into());
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run(env))
    }
}

impl<E: Effect> EffectExt for E {}
