//! ZipWith combinator - combines two concurrent effects with a function.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

use super::zip::first_error;

/// Runs two effects concurrently and combines their values with a function.
///
/// Failure selection follows [`Zip`](super::Zip).
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = pure::<_, Error, ()>(2).zip_with(pure(3), |a, b| a * b);
/// assert_eq!(effect.run(&()).await, Ok(6));
/// # });
/// ```
#[derive(Debug)]
pub struct ZipWith<E1, E2, F> {
    pub(crate) first: E1,
    pub(crate) second: E2,
    pub(crate) f: F,
}

impl<E1, E2, F> ZipWith<E1, E2, F> {
    /// Create a new ZipWith combinator.
    pub fn new(first: E1, second: E2, f: F) -> Self {
        ZipWith { first, second, f }
    }
}

impl<E1, E2, F, R> Effect for ZipWith<E1, E2, F>
where
    E1: Effect,
    E1::Error: Fault,
    E2: Effect<Error = E1::Error, Env = E1::Env>,
    F: Fn(E1::Output, E2::Output) -> R + Send + Sync,
    R: Send,
{
    type Output = R;
    type Error = E1::Error;
    type Env = E1::Env;

    async fn run(&self, env: &Self::Env) -> Result<R, Self::Error> {
        match futures::join!(self.first.run(env), self.second.run(env)) {
            (Ok(a), Ok(b)) => call(|| (self.f)(a, b)),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(left), Err(right)) => Err(first_error([left, right])),
        }
    }
}
