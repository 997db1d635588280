//! Tap combinator - runs a side effect and keeps the original value.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// Tap combinator - runs a side effect on success, returning the original
/// value.
///
/// A failure of the side effect fails the whole effect.
pub struct Tap<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for Tap<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tap")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, E2> Effect for Tap<Inner, F>
where
    Inner: Effect,
    Inner::Error: Fault,
    F: Fn(&Inner::Output) -> E2 + Send + Sync,
    E2: Effect<Error = Inner::Error, Env = Inner::Env>,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let value = self.inner.run(env).await?;
        call::<Self::Error, _>(|| (self.f)(&value))?.run(env).await?;
        Ok(value)
    }
}
