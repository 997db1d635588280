//! Map combinator - transforms the success value of an effect.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// Map combinator - transforms the success value.
///
/// Failures pass through untouched and `f` is never called for them.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = pure::<_, Error, ()>(21).map(|x| x * 2);
/// assert_eq!(effect.run(&()).await, Ok(42));
/// # });
/// ```
pub struct Map<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for Map<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, U> Effect for Map<Inner, F>
where
    Inner: Effect,
    Inner::Error: Fault,
    F: Fn(Inner::Output) -> U + Send + Sync,
    U: Send,
{
    type Output = U;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<U, Self::Error> {
        let value = self.inner.run(env).await?;
        call(|| (self.f)(value))
    }
}
