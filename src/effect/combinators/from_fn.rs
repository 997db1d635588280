//! FromFn - effect from a synchronous function.

use std::marker::PhantomData;

use crate::effect::guard::invoke;
use crate::effect::trait_def::Effect;
use crate::env::HasCancel;
use crate::error::Fault;

/// Effect from a synchronous function.
///
/// The function is stored directly in the struct and invoked on every run,
/// unless the environment is already cancelled. A panic inside the function
/// becomes `E::panicked(..)`.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = from_fn(|_: &()| Ok::<_, Error>(21)).map(|x| x * 2);
/// assert_eq!(effect.run(&()).await, Ok(42));
///
/// let boom = from_fn(|_: &()| -> Result<i32, Error> { panic!("bad index") });
/// assert!(boom.run(&()).await.unwrap_err().is_exceptional());
/// # });
/// ```
pub struct FromFn<F, Env> {
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn(&Env)>,
}

impl<F, Env> std::fmt::Debug for FromFn<F, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").field("f", &"<function>").finish()
    }
}

impl<F, Env> FromFn<F, Env> {
    /// Create a new FromFn effect.
    pub fn new(f: F) -> Self {
        FromFn {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<F, T, E, Env> Effect for FromFn<F, Env>
where
    F: Fn(&Env) -> Result<T, E> + Send + Sync,
    T: Send,
    E: Fault,
    Env: HasCancel + Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(&self, env: &Env) -> Result<T, E> {
        invoke(env, || (self.f)(env)).and_then(|result| result)
    }
}
