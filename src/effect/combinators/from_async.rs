//! FromAsync - effect from an async function.

use std::future::Future;
use std::marker::PhantomData;

use crate::effect::guard::{guarded, invoke};
use crate::effect::trait_def::Effect;
use crate::env::HasCancel;
use crate::error::Fault;

/// Effect from an async function.
///
/// Every run calls the function to obtain a fresh future and races it
/// against the environment's cancellation signal. Cancellation drops the
/// future and fails with `E::cancelled()`; a panic while building or polling
/// the future becomes `E::panicked(..)`.
///
/// The future cannot borrow the environment. Clone what it needs first:
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = from_async(|_: &()| async { Ok::<_, Error>(42) });
/// assert_eq!(effect.run(&()).await, Ok(42));
/// # });
/// ```
pub struct FromAsync<F, Env> {
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn(&Env)>,
}

impl<F, Env> std::fmt::Debug for FromAsync<F, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromAsync")
            .field("f", &"<function>")
            .finish()
    }
}

impl<F, Env> FromAsync<F, Env> {
    /// Create a new FromAsync effect.
    pub fn new(f: F) -> Self {
        FromAsync {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut, T, E, Env> Effect for FromAsync<F, Env>
where
    F: Fn(&Env) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Fault,
    Env: HasCancel + Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(&self, env: &Env) -> Result<T, E> {
        let fut = invoke::<E, _>(env, || (self.f)(env))?;
        guarded(env, fut).await
    }
}
