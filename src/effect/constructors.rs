//! Constructor functions for creating effects.
//!
//! These functions provide ergonomic ways to create effects without
//! directly constructing the combinator types.

use std::future::Future;

use crate::effect::combinators::{Apply, Fail, FromAsync, FromFn, FromResult, Pure, Zip3};
use crate::effect::trait_def::Effect;
use crate::env::HasCancel;
use crate::error::Fault;
use crate::semigroup::Semigroup;

/// Create an effect that always succeeds with a clone of `value`.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = pure::<_, Error, ()>(42);
/// assert_eq!(effect.run(&()).await, Ok(42));
/// # });
/// ```
pub fn pure<T, E, Env>(value: T) -> Pure<T, E, Env>
where
    T: Clone + Send + Sync,
    E: Send,
    Env: HasCancel + Clone + Send + Sync,
{
    Pure::new(value)
}

/// Create an effect that always fails with a clone of `error`.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = fail::<i32, _, ()>(Error::new("error"));
/// assert_eq!(effect.run(&()).await, Err(Error::new("error")));
/// # });
/// ```
pub fn fail<T, E, Env>(error: E) -> Fail<T, E, Env>
where
    T: Send,
    E: Clone + Send + Sync,
    Env: HasCancel + Clone + Send + Sync,
{
    Fail::new(error)
}

/// Lift an error into a failing effect.
///
/// The same as [`fail`], for code that reads better as raising.
pub fn raise<T, E, Env>(error: impl Into<E>) -> Fail<T, E, Env>
where
    T: Send,
    E: Clone + Send + Sync,
    Env: HasCancel + Clone + Send + Sync,
{
    Fail::new(error.into())
}

/// Create an effect from a synchronous function.
///
/// See [`FromFn`] for cancellation and panic handling.
pub fn from_fn<T, E, Env, F>(f: F) -> FromFn<F, Env>
where
    F: Fn(&Env) -> Result<T, E> + Send + Sync,
    T: Send,
    E: Fault,
    Env: HasCancel + Clone + Send + Sync,
{
    FromFn::new(f)
}

/// Create an effect from an async function.
///
/// See [`FromAsync`] for cancellation and panic handling.
pub fn from_async<T, E, Env, F, Fut>(f: F) -> FromAsync<F, Env>
where
    F: Fn(&Env) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Fault,
    Env: HasCancel + Clone + Send + Sync,
{
    FromAsync::new(f)
}

/// Create an effect from a Result.
pub fn from_result<T, E, Env>(result: Result<T, E>) -> FromResult<T, E, Env>
where
    T: Clone + Send + Sync,
    E: Clone + Send + Sync,
    Env: HasCancel + Clone + Send + Sync,
{
    FromResult::new(result)
}

/// Create an effect from an Option, failing with `error` on `None`.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let missing = from_option::<i32, _, ()>(None, Error::expected(404, "not found"));
/// assert!(missing.run(&()).await.unwrap_err().has_code(404));
/// # });
/// ```
pub fn from_option<T, E, Env>(option: Option<T>, error: E) -> FromResult<T, E, Env>
where
    T: Clone + Send + Sync,
    E: Clone + Send + Sync,
    Env: HasCancel + Clone + Send + Sync,
{
    FromResult::new(option.ok_or(error))
}

/// Apply the function produced by `ff` to the value produced by `fa`,
/// running both concurrently and aggregating failures.
///
/// See [`Apply`].
pub fn apply<FF, FA, F, B>(ff: FF, fa: FA) -> Apply<FF, FA>
where
    FF: Effect<Output = F>,
    FF::Error: Fault + Semigroup,
    FA: Effect<Error = FF::Error, Env = FF::Env>,
    F: FnOnce(FA::Output) -> B + Send,
    B: Send,
{
    Apply::new(ff, fa)
}

/// Run three effects concurrently into a flat tuple.
pub fn zip3<E1, E2, E3>(e1: E1, e2: E2, e3: E3) -> Zip3<E1, E2, E3>
where
    E1: Effect,
    E1::Error: Fault,
    E2: Effect<Error = E1::Error, Env = E1::Env>,
    E3: Effect<Error = E1::Error, Env = E1::Env>,
{
    Zip3::new(e1, e2, e3)
}
