//! Fail - an effect that always fails.

use std::marker::PhantomData;

use crate::effect::trait_def::Effect;
use crate::env::HasCancel;

/// An effect that fails with a clone of a stored error.
///
/// Created by [`fail`](crate::effect::fail).
pub struct Fail<T, E, Env> {
    pub(crate) error: E,
    pub(crate) _phantom: PhantomData<fn() -> (T, Env)>,
}

impl<T, E: std::fmt::Debug, Env> std::fmt::Debug for Fail<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fail").field("error", &self.error).finish()
    }
}

impl<T, E, Env> Fail<T, E, Env> {
    /// Create a new Fail effect.
    pub fn new(error: E) -> Self {
        Fail {
            error,
            _phantom: PhantomData,
        }
    }
}

impl<T, E, Env> Effect for Fail<T, E, Env>
where
    T: Send,
    E: Clone + Send + Sync,
    Env: HasCancel + Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(&self, _env: &Env) -> Result<T, E> {
        Err(self.error.clone())
    }
}
