//! Catch combinator for selective error recovery.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;
use crate::predicate::Predicate;

/// Recovers from errors matching a predicate.
///
/// The predicate is checked at most once per run, and only on failure.
/// Errors it rejects pass through unchanged, as does every success.
///
/// Created by [`Fallible::catch`](super::Fallible::catch) and its derived
/// forms.
pub struct Catch<Inner, P, F> {
    pub(crate) inner: Inner,
    pub(crate) predicate: P,
    pub(crate) recover: F,
}

impl<Inner, P, F> std::fmt::Debug for Catch<Inner, P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catch")
            .field("inner", &"<effect>")
            .field("predicate", &"<predicate>")
            .field("recover", &"<function>")
            .finish()
    }
}

impl<Inner, P, F> Catch<Inner, P, F> {
    /// Create a new Catch combinator.
    pub fn new(inner: Inner, predicate: P, recover: F) -> Self {
        Catch {
            inner,
            predicate,
            recover,
        }
    }
}

impl<Inner, P, F, R> Effect for Catch<Inner, P, F>
where
    Inner: Effect,
    Inner::Error: Fault,
    P: Predicate<Inner::Error>,
    F: Fn(Inner::Error) -> R + Send + Sync,
    R: Effect<Output = Inner::Output, Error = Inner::Error, Env = Inner::Env>,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let error = match self.inner.run(env).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        if call::<Self::Error, _>(|| self.predicate.check(&error))? {
            call::<Self::Error, _>(|| (self.recover)(error))?
                .run(env)
                .await
        } else {
            Err(error)
        }
    }
}
