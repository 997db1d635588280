//! OrElse combinator - recovers from errors.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// OrElse combinator - runs a recovery effect built from the error.
///
/// Every failure is handed to `f`; use
/// [`Fallible::catch`](crate::effect::Fallible::catch) to recover selectively.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = fail::<i32, _, ()>(Error::new("cold cache"))
///     .or_else(|_| pure::<_, Error, ()>(0));
/// assert_eq!(effect.run(&()).await, Ok(0));
/// # });
/// ```
pub struct OrElse<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for OrElse<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrElse")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, E2> Effect for OrElse<Inner, F>
where
    Inner: Effect,
    E2: Effect<Output = Inner::Output, Env = Inner::Env>,
    E2::Error: Fault,
    F: Fn(Inner::Error) -> E2 + Send + Sync,
{
    type Output = Inner::Output;
    type Error = E2::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        match self.inner.run(env).await {
            Ok(value) => Ok(value),
            Err(e) => call::<Self::Error, _>(|| (self.f)(e))?.run(env).await,
        }
    }
}
