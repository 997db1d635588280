//! MapErr combinator - transforms the error value of an effect.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// MapErr combinator - transforms the error value.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = fail::<i32, _, ()>(Error::new("refused"))
///     .map_err(|e| e.context("connecting to cache"));
/// let err = effect.run(&()).await.unwrap_err();
/// assert_eq!(err.to_string(), "connecting to cache: refused");
/// # });
/// ```
pub struct MapErr<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for MapErr<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapErr")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, E2> Effect for MapErr<Inner, F>
where
    Inner: Effect,
    F: Fn(Inner::Error) -> E2 + Send + Sync,
    E2: Fault,
{
    type Output = Inner::Output;
    type Error = E2;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, E2> {
        match self.inner.run(env).await {
            Ok(value) => Ok(value),
            Err(e) => Err(call::<E2, _>(|| (self.f)(e))?),
        }
    }
}
