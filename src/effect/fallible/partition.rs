//! Partitioning a collection of fallible effects.

use crate::effect::trait_def::Effect;

/// Runs every effect in order and splits the outcomes into
/// `(failures, successes)`.
///
/// Never short-circuits: a failure is recorded and the next effect runs.
/// The combined effect itself never fails.
///
/// Created by [`partition`].
#[derive(Debug)]
pub struct Partition<Eff> {
    pub(crate) effects: Vec<Eff>,
}

impl<Eff: Effect> Effect for Partition<Eff> {
    type Output = (Vec<Eff::Error>, Vec<Eff::Output>);
    type Error = Eff::Error;
    type Env = Eff::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let mut failures = Vec::new();
        let mut successes = Vec::new();
        for effect in &self.effects {
            match effect.run(env).await {
                Ok(value) => successes.push(value),
                Err(error) => failures.push(error),
            }
        }
        Ok((failures, successes))
    }
}

/// Run every effect and collect `(failures, successes)`.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effects = vec![
///     pure::<i32, Error, ()>(1).boxed(),
///     fail(Error::new("bad")).boxed(),
///     pure(3).boxed(),
/// ];
/// let (failures, successes) = partition(effects).run(&()).await.unwrap();
/// assert_eq!(successes, vec![1, 3]);
/// assert_eq!(failures, vec![Error::new("bad")]);
/// # });
/// ```
pub fn partition<Eff: Effect>(effects: impl IntoIterator<Item = Eff>) -> Partition<Eff> {
    Partition {
        effects: effects.into_iter().collect(),
    }
}

/// Run every effect and keep only the failures.
pub fn fails<Eff: Effect>(
    effects: impl IntoIterator<Item = Eff>,
) -> impl Effect<Output = Vec<Eff::Error>, Error = Eff::Error, Env = Eff::Env> {
    Fails(partition(effects))
}

/// Run every effect and keep only the successes.
pub fn succs<Eff: Effect>(
    effects: impl IntoIterator<Item = Eff>,
) -> impl Effect<Output = Vec<Eff::Output>, Error = Eff::Error, Env = Eff::Env> {
    Succs(partition(effects))
}

struct Fails<Eff>(Partition<Eff>);

impl<Eff: Effect> Effect for Fails<Eff> {
    type Output = Vec<Eff::Error>;
    type Error = Eff::Error;
    type Env = Eff::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let (failures, _) = self.0.run(env).await?;
        Ok(failures)
    }
}

struct Succs<Eff>(Partition<Eff>);

impl<Eff: Effect> Effect for Succs<Eff> {
    type Output = Vec<Eff::Output>;
    type Error = Eff::Error;
    type Env = Eff::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let (_, successes) = self.0.run(env).await?;
        Ok(successes)
    }
}
