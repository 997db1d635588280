//! Schedule-driven repetition of successful effects.
//!
//! [`Repeat`] re-runs an effect while it keeps succeeding and the schedule
//! keeps yielding delays, returning the last success. [`Reduce`] does the
//! same but folds every success into an accumulator.
//!
//! A failure ends [`Repeat`] with that failure. [`Reduce`] treats an ordinary
//! failure as the end of the input and returns the accumulator; only a
//! cancellation-class failure is reported as a failure.

use crate::effect::guard::{call, wait};
use crate::effect::trait_def::Effect;
use crate::error::Fault;
use crate::predicate::Predicate;
use crate::schedule::Schedule;

/// Re-runs an effect on success, according to a schedule.
///
/// Created by [`EffectExt::repeat`](crate::effect::EffectExt::repeat) and
/// its variants.
pub struct Repeat<Inner, P> {
    pub(crate) inner: Inner,
    pub(crate) schedule: Schedule,
    pub(crate) predicate: P,
}

impl<Inner, P> std::fmt::Debug for Repeat<Inner, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repeat")
            .field("inner", &"<effect>")
            .field("schedule", &self.schedule)
            .field("predicate", &"<predicate>")
            .finish()
    }
}

impl<Inner, P> Effect for Repeat<Inner, P>
where
    Inner: Effect,
    Inner::Error: Fault,
    P: Predicate<Inner::Output>,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let mut delays = self.schedule.iter();
        loop {
            let value = self.inner.run(env).await?;
            if !call::<Self::Error, _>(|| self.predicate.check(&value))? {
                return Ok(value);
            }
            let Some(delay) = delays.next() else {
                return Ok(value);
            };
            if !wait(env, delay).await {
                return Err(Fault::cancelled());
            }
        }
    }
}

/// Folds the successes of repeated runs into an accumulator.
///
/// Each run's value is folded in before the continuation predicate's verdict
/// is acted on. The fold ends, returning the accumulator, when the predicate
/// says stop, when the schedule is exhausted, or when a run fails with an
/// ordinary error.
///
/// Created by [`EffectExt::reduce`](crate::effect::EffectExt::reduce) and
/// its variants.
pub struct Reduce<Inner, A, F, P> {
    pub(crate) inner: Inner,
    pub(crate) schedule: Schedule,
    pub(crate) seed: A,
    pub(crate) fold: F,
    pub(crate) predicate: P,
}

impl<Inner, A, F, P> std::fmt::Debug for Reduce<Inner, A, F, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reduce")
            .field("inner", &"<effect>")
            .field("schedule", &self.schedule)
            .field("fold", &"<function>")
            .field("predicate", &"<predicate>")
            .finish()
    }
}

impl<Inner, A, F, P> Effect for Reduce<Inner, A, F, P>
where
    Inner: Effect,
    Inner::Error: Fault,
    A: Clone + Send + Sync,
    F: Fn(A, Inner::Output) -> A + Send + Sync,
    P: Predicate<Inner::Output>,
{
    type Output = A;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<A, Self::Error> {
        let mut acc = self.seed.clone();
        let mut delays = self.schedule.iter();
        loop {
            let value = match self.inner.run(env).await {
                Ok(value) => value,
                Err(error) if error.is_cancelled() => return Err(error),
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("reduce stopped by a failed run");
                    return Ok(acc);
                }
            };

            let keep_going = call::<Self::Error, _>(|| self.predicate.check(&value))?;
            acc = call::<Self::Error, _>(|| (self.fold)(acc, value))?;
            if !keep_going {
                return Ok(acc);
            }

            let Some(delay) = delays.next() else {
                return Ok(acc);
            };
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
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicI32>, impl Effect<Output = i32, Error = Error, Env = ()>) {
        let n = Arc::new(AtomicI32::new(0));
        let runs = n.clone();
        let effect =
            from_fn(move |_: &()| Ok::<_, Error>(runs.fetch_add(1, Ordering::SeqCst) + 1));
        (n, effect)
    }

    #[tokio::test]
    async fn test_repeat_returns_last_success() {
        let (runs, effect) = counter();
        assert_eq!(effect.repeat(Schedule::recurs(3)).run(&()).await, Ok(4));
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_repeat_stops_on_failure() {
        let (runs, effect) = counter();
        let effect = effect.filter(|n| *n < 3).repeat(Schedule::forever());
        assert!(effect.run(&()).await.unwrap_err().is_cancelled());
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_repeat_while_and_until() {
        let (_, effect) = counter();
        assert_eq!(
            effect
                .repeat_while(Schedule::forever(), |n: &i32| *n < 5)
                .run(&())
                .await,
            Ok(5)
        );

        let (_, effect) = counter();
        assert_eq!(
            effect
                .repeat_until(Schedule::forever(), |n: &i32| *n == 2)
                .run(&())
                .await,
            Ok(2)
        );
    }

    #[tokio::test]
    async fn test_reduce_folds_until_failure() {
        let (_, effect) = counter();
        let effect = effect
            .and_then(|n| {
                if n <= 3 {
                    pure(n).boxed()
                } else {
                    fail(Error::new("drained")).boxed()
                }
            })
            .reduce(Schedule::forever(), 0, |acc, n| acc + n);
        assert_eq!(effect.run(&()).await, Ok(6));
    }

    #[tokio::test]
    async fn test_reduce_stops_at_schedule_end() {
        let (_, effect) = counter();
        let effect = effect.reduce(Schedule::recurs(2), Vec::new(), |mut acc, n| {
            acc.push(n);
            acc
        });
        assert_eq!(effect.run(&()).await, Ok(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_reduce_propagates_cancellation() {
        let effect =
            fail::<i32, _, ()>(Error::cancelled()).reduce(Schedule::forever(), 0, |a, b| a + b);
        assert_eq!(effect.run(&()).await, Err(Error::cancelled()));
    }

    #[tokio::test]
    async fn test_reduce_while_includes_the_last_value() {
        let (_, effect) = counter();
        let effect =
            effect.reduce_while(Schedule::forever(), 0, |acc, n| acc + n, |n: &i32| *n < 3);
        assert_eq!(effect.run(&()).await, Ok(6));
    }

    #[tokio::test]
    async fn test_reduce_until() {
        let (_, effect) = counter();
        let effect =
            effect.reduce_until(Schedule::forever(), 0, |acc, n| acc + n, |n: &i32| *n == 4);
        assert_eq!(effect.run(&()).await, Ok(10));
    }
}
