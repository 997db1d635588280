//! AndThen combinator - chains dependent effects.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// AndThen combinator - chains dependent effects (monadic bind).
///
/// The continuation runs strictly after the first effect succeeds. A failure
/// short-circuits: `f` is never called.
///
/// The error type of the chained effect must match the error type
/// of the original effect. Use `map_err` to convert error types
/// before chaining.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = pure::<_, Error, ()>(21).and_then(|x| pure(x * 2));
/// assert_eq!(effect.run(&()).await, Ok(42));
/// # });
/// ```
pub struct AndThen<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for AndThen<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndThen")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, E2> Effect for AndThen<Inner, F>
where
    Inner: Effect,
    Inner::Error: Fault,
    E2: Effect<Error = Inner::Error, Env = Inner::Env>,
    F: Fn(Inner::Output) -> E2 + Send + Sync,
{
    type Output = E2::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let value = self.inner.run(env).await?;
        let next = call::<Self::Error, _>(|| (self.f)(value))?;
        next.run(env).await
    }
}
