//! Pure - an effect that always succeeds.

use std::marker::PhantomData;

use crate::effect::trait_def::Effect;
use crate::env::HasCancel;

/// An effect that succeeds with a clone of a stored value.
///
/// Created by [`pure`](crate::effect::pure).
pub struct Pure<T, E, Env> {
    pub(crate) value: T,
    pub(crate) _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<T: std::fmt::Debug, E, Env> std::fmt::Debug for Pure<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pure").field("value", &self.value).finish()
    }
}

impl<T, E, Env> Pure<T, E, Env> {
    /// Create a new Pure effect.
    pub fn new(value: T) -> Self {
        Pure {
            value,
            _phantom: PhantomData,
        }
    }
}

impl<T, E, Env> Effect for Pure<T, E, Env>
where
    T: Clone + Send + Sync,
    E: Send,
    Env: HasCancel + Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(&self, _env: &Env) -> Result<T, E> {
        Ok(self.value.clone())
    }
}
