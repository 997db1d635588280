//! FromResult - lift a `Result` into an effect.

use std::marker::PhantomData;

use crate::effect::trait_def::Effect;
use crate::env::HasCancel;

/// An effect that replays a stored `Result`.
///
/// Created by [`from_result`](crate::effect::from_result) and
/// [`from_option`](crate::effect::from_option).
pub struct FromResult<T, E, Env> {
    pub(crate) result: Result<T, E>,
    pub(crate) _phantom: PhantomData<fn() -> Env>,
}

impl<T: std::fmt::Debug, E: std::fmt::Debug, Env> std::fmt::Debug for FromResult<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromResult")
            .field("result", &self.result)
            .finish()
    }
}

impl<T, E, Env> FromResult<T, E, Env> {
    /// Create a new FromResult effect.
    pub fn new(result: Result<T, E>) -> Self {
        FromResult {
            result,
            _phantom: PhantomData,
        }
    }
}

impl<T, E, Env> Effect for FromResult<T, E, Env>
where
    T: Clone + Send + Sync,
    E: Clone + Send + Sync,
    Env: HasCancel + Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(&self, _env: &Env) -> Result<T, E> {
        self.result.clone()
    }
}
