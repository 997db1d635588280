//! Apply combinator - applicative application with error aggregation.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;
use crate::semigroup::Semigroup;

/// Runs an effect producing a function and an effect producing its argument
/// concurrently, then applies one to the other.
///
/// When both sides fail, the errors are combined with
/// [`Semigroup::combine`], left first. This is the one place where two
/// concurrent failures are both kept; [`Zip`](super::Zip) keeps only one.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let ff = pure::<_, Error, ()>(|x: i32| x + 1);
/// assert_eq!(apply(ff, pure(41)).run(&()).await, Ok(42));
///
/// let both = apply(
///     fail::<fn(i32) -> i32, _, ()>(Error::new("no function")),
///     fail::<i32, _, ()>(Error::new("no argument")),
/// );
/// let err = both.run(&()).await.unwrap_err();
/// assert_eq!(err.errors().len(), 2);
/// # });
/// ```
#[derive(Debug)]
pub struct Apply<FF, FA> {
    pub(crate) function: FF,
    pub(crate) argument: FA,
}

impl<FF, FA> Apply<FF, FA> {
    /// Create a new Apply combinator.
    pub fn new(function: FF, argument: FA) -> Self {
        Apply { function, argument }
    }
}

impl<FF, FA, F, B> Effect for Apply<FF, FA>
where
    FF: Effect<Output = F>,
    FF::Error: Fault + Semigroup,
    FA: Effect<Error = FF::Error, Env = FF::Env>,
    F: FnOnce(FA::Output) -> B + Send,
    B: Send,
{
    type Output = B;
    type Error = FF::Error;
    type Env = FF::Env;

    async fn run(&self, env: &Self::Env) -> Result<B, Self::Error> {
        match futures::join!(self.function.run(env), self.argument.run(env)) {
            (Ok(f), Ok(a)) => call(|| f(a)),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(left), Err(right)) => Err(left.combine(right)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::prelude::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_apply_runs_both_sides_concurrently() {
        let started = tokio::time::Instant::now();
        let ff = from_async(|_: &()| async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            Ok::<_, Error>(|x: i32| x + 1)
        });
        let fa = from_async(|_: &()| async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            Ok::<_, Error>(41)
        });

        assert_eq!(apply(ff, fa).run(&()).await, Ok(42));
        assert!(started.elapsed() < Duration::from_millis(80));
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_waits_for_both_before_aggregating() {
        let started = tokio::time::Instant::now();
        let ff = from_async(|_: &()| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err::<fn(i32) -> i32, _>(Error::expected(1, "fast"))
        });
        let fa = from_async(|_: &()| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err::<i32, _>(Error::expected(2, "slow"))
        });

        let err = apply(ff, fa).run(&()).await.unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_apply_keeps_single_error() {
        let effect = apply(
            pure::<_, Error, ()>(|x: i32| x * 2),
            fail::<i32, _, ()>(Error::new("bad input")),
        );
        assert_eq!(effect.run(&()).await, Err(Error::new("bad input")));
    }

    #[tokio::test]
    async fn test_apply_aggregates_left_first() {
        let effect = apply(
            fail::<fn(i32) -> i32, _, ()>(Error::expected(1, "left")),
            fail::<i32, _, ()>(Error::expected(2, "right")),
        );
        let err = effect.run(&()).await.unwrap_err();
        let codes: Vec<_> = err.errors().iter().map(Error::code).collect();
        assert_eq!(codes, vec![1, 2]);
    }
}
