//! Concurrent combination of many effects.
//!
//! - [`apply_all`] runs every effect and aggregates all failures
//! - [`zip_all`] runs every effect and reports a single failure
//! - [`race`] returns whichever effect finishes first
//!
//! All branches are polled concurrently within the running task; nothing is
//! spawned. The effects must share one type, so mixed pipelines are usually
//! [boxed](crate::effect::EffectExt::boxed) first.
//!
//! ```rust
//! use undertow::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let effects = vec![
//!     pure::<_, Error, ()>(1).boxed(),
//!     fail(Error::new("a")).boxed(),
//!     fail(Error::new("b")).boxed(),
//! ];
//!
//! let err = apply_all(effects).run(&()).await.unwrap_err();
//! assert_eq!(err.errors().len(), 2);
//! # });
//! ```

use futures::future::{join_all, select_all};

use crate::effect::combinators::first_error;
use crate::effect::trait_def::Effect;
use crate::error::Fault;
use crate::semigroup::Semigroup;

/// Runs every effect concurrently; aggregates failures.
///
/// Created by [`apply_all`].
#[derive(Debug, Clone)]
pub struct ApplyAll<Eff> {
    effects: Vec<Eff>,
}

impl<Eff> Effect for ApplyAll<Eff>
where
    Eff: Effect,
    Eff::Error: Semigroup,
{
    type Output = Vec<Eff::Output>;
    type Error = Eff::Error;
    type Env = Eff::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let results = join_all(self.effects.iter().map(|effect| effect.run(env))).await;

        let mut values = Vec::with_capacity(results.len());
        let mut failure: Option<Eff::Error> = None;
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(error) => {
                    failure = Some(match failure {
                        Some(acc) => acc.combine(error),
                        None => error,
                    });
                }
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(values),
        }
    }
}

/// Runs every effect concurrently; reports the first failure.
///
/// Created by [`zip_all`].
#[derive(Debug, Clone)]
pub struct ZipAll<Eff> {
    effects: Vec<Eff>,
}

impl<Eff> Effect for ZipAll<Eff>
where
    Eff: Effect,
    Eff::Error: Fault,
{
    type Output = Vec<Eff::Output>;
    type Error = Eff::Error;
    type Env = Eff::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let results = join_all(self.effects.iter().map(|effect| effect.run(env))).await;
        if results.iter().all(Result::is_ok) {
            return Ok(results.into_iter().flatten().collect());
        }
        Err(first_error(results.into_iter().filter_map(Result::err)))
    }
}

/// Returns the outcome of whichever effect finishes first.
///
/// Created by [`race`].
#[derive(Debug, Clone)]
pub struct Race<Eff> {
    effects: Vec<Eff>,
}

impl<Eff> Effect for Race<Eff>
where
    Eff: Effect,
    Eff::Error: Fault,
{
    type Output = Eff::Output;
    type Error = Eff::Error;
    type Env = Eff::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        if self.effects.is_empty() {
            return Err(Fault::cancelled());
        }
        let runs = self.effects.iter().map(|effect| Box::pin(effect.run(env)));
        let (outcome, _index, _rest) = select_all(runs).await;
        outcome
    }
}

/// Run all effects concurrently, collecting every success.
///
/// If any effect fails, the failures are combined left to right with
/// [`Semigroup::combine`]; for [`Error`](crate::Error) that is a flattened
/// aggregate. Every effect runs to completion.
pub fn apply_all<Eff>(effects: impl IntoIterator<Item = Eff>) -> ApplyAll<Eff>
where
    Eff: Effect,
    Eff::Error: Semigroup,
{
    ApplyAll {
        effects: effects.into_iter().collect(),
    }
}

/// Run all effects concurrently, collecting every success.
///
/// If any effect fails, a single error is reported: the first cancellation
/// if there is one, otherwise the leftmost failure.
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let ok = zip_all(vec![pure::<_, Error, ()>(1), pure(2)]);
/// assert_eq!(ok.run(&()).await, Ok(vec![1, 2]));
/// # });
/// ```
pub fn zip_all<Eff>(effects: impl IntoIterator<Item = Eff>) -> ZipAll<Eff>
where
    Eff: Effect,
    Eff::Error: Fault,
{
    ZipAll {
        effects: effects.into_iter().collect(),
    }
}

/// Race effects against each other.
///
/// The first effect to finish decides the outcome, success or failure; the
/// others are dropped. Racing nothing fails with `E::cancelled()`.
pub fn race<Eff>(effects: impl IntoIterator<Item = Eff>) -> Race<Eff>
where
    Eff: Effect,
    Eff::Error: Fault,
{
    Race {
        effects: effects.into_iter().collect(),
    }
}
