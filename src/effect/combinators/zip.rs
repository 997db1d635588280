//! Zip combinators - run independent effects concurrently into a tuple.

use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// Combines two effects, running them concurrently and returning both
/// results.
///
/// Both sides always run to completion before a result is produced. Unlike
/// [`Apply`](super::Apply), `Zip` does not aggregate failures:
///
/// - one side fails: that error
/// - both fail: the cancellation error if either side was cancelled,
///   otherwise the left error
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = pure::<_, Error, ()>(1).zip(pure(2));
/// assert_eq!(effect.run(&()).await, Ok((1, 2)));
///
/// let both = fail::<i32, _, ()>(Error::new("left"))
///     .zip(fail::<i32, _, ()>(Error::new("right")));
/// assert_eq!(both.run(&()).await, Err(Error::new("left")));
/// # });
/// ```
#[derive(Debug)]
pub struct Zip<E1, E2> {
    pub(crate) first: E1,
    pub(crate) second: E2,
}

impl<E1, E2> Zip<E1, E2> {
    /// Create a new Zip combinator from two effects.
    pub fn new(first: E1, second: E2) -> Self {
        Zip { first, second }
    }
}

impl<E1, E2> Effect for Zip<E1, E2>
where
    E1: Effect,
    E1::Error: Fault,
    E2: Effect<Error = E1::Error, Env = E1::Env>,
{
    type Output = (E1::Output, E2::Output);
    type Error = E1::Error;
    type Env = E1::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let (a, b) = futures::join!(self.first.run(env), self.second.run(env));
        match (a, b) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(left), Err(right)) => Err(first_error([left, right])),
        }
    }
}

/// Combines three effects concurrently into a flat tuple.
///
/// Failure selection follows [`Zip`].
#[derive(Debug)]
pub struct Zip3<E1, E2, E3> {
    e1: E1,
    e2: E2,
    e3: E3,
}

impl<E1, E2, E3> Zip3<E1, E2, E3> {
    /// Create a new Zip3 combinator from three effects.
    pub fn new(e1: E1, e2: E2, e3: E3) -> Self {
        Zip3 { e1, e2, e3 }
    }
}

impl<E1, E2, E3> Effect for Zip3<E1, E2, E3>
where
    E1: Effect,
    E1::Error: Fault,
    E2: Effect<Error = E1::Error, Env = E1::Env>,
    E3: Effect<Error = E1::Error, Env = E1::Env>,
{
    type Output = (E1::Output, E2::Output, E3::Output);
    type Error = E1::Error;
    type Env = E1::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let (r1, r2, r3) = futures::join!(self.e1.run(env), self.e2.run(env), self.e3.run(env));
        match (r1, r2, r3) {
            (Ok(a), Ok(b), Ok(c)) => Ok((a, b, c)),
            (r1, r2, r3) => Err(first_error(
                [r1.err(), r2.err(), r3.err()].into_iter().flatten(),
            )),
        }
    }
}

/// Pick the error a non-aggregating combinator reports: the first
/// cancellation if there is one, otherwise the leftmost error.
///
/// Must be called with at least one error.
pub(crate) fn first_error<E: Fault>(errors: impl IntoIterator<Item = E>) -> E {
    let mut first = None;
    for error in errors {
        if error.is_cancelled() {
            return error;
        }
        first.get_or_insert(error);
    }
    first.unwrap_or_else(E::cancelled)
}
