//! Type erasure for effects.
//!
//! Every combinator returns its own concrete type, which keeps composition
//! allocation-free but makes some shapes awkward: heterogeneous lists,
//! branches returning different pipelines, recursion, and effects stored in
//! struct fields. [`BoxedEffect`] erases the type behind one `Arc`.
//!
//! A boxed effect owns a clone of the environment for the duration of each
//! run, so keep heavyweight environment state behind `Arc`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::effect::trait_def::Effect;
use crate::env::HasCancel;

/// A pinned, heap-allocated `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type RunFn<T, E, Env> = dyn Fn(Env) -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// An effect whose concrete type has been erased.
///
/// Clones share the wrapped effect, so a boxed effect can be handed to
/// several tasks and run by each of them.
///
/// ```rust
/// use undertow::prelude::*;
///
/// fn lookup(cached: bool) -> BoxedEffect<&'static str, Error, ()> {
///     if cached {
///         pure("hit").boxed()
///     } else {
///         fail(Error::expected(404, "miss"))
///             .or_else(|_| pure("fallback"))
///             .boxed()
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let both = zip_all(vec![lookup(true), lookup(false)]);
/// assert_eq!(both.run(&()).await, Ok(vec!["hit", "fallback"]));
/// # });
/// ```
pub struct BoxedEffect<T, E, Env> {
    run_fn: Arc<RunFn<T, E, Env>>,
}

impl<T, E, Env> Clone for BoxedEffect<T, E, Env> {
    fn clone(&self) -> Self {
        BoxedEffect {
            run_fn: Arc::clone(&self.run_fn),
        }
    }
}

impl<T, E, Env> std::fmt::Debug for BoxedEffect<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEffect")
            .finish_non_exhaustive()
    }
}

impl<T, E, Env> BoxedEffect<T, E, Env>
where
    T: Send + 'static,
    E: Send + 'static,
    Env: HasCancel + Clone + Send + Sync + 'static,
{
    /// Erase `effect`. Usually reached through
    /// [`EffectExt::boxed`](crate::effect::EffectExt::boxed).
    pub fn new<Eff>(effect: Eff) -> Self
    where
        Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    {
        let effect = Arc::new(effect);
        BoxedEffect {
            run_fn: Arc::new(move |env: Env| {
                let effect = Arc::clone(&effect);
                Box::pin(async move { effect.run(&env).await })
            }),
        }
    }
}

impl<T, E, Env> Effect for BoxedEffect<T, E, Env>
where
    T: Send,
    E: Send,
    Env: HasCancel + Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    fn run(&self, env: &Env) -> impl Future<Output = Result<T, E>> + Send {
        (self.run_fn)(env.clone())
    }
}
