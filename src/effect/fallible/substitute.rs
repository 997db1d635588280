//! Substitution forms: replace a failure with a value, an effect, or
//! another error, and fold both outcomes with `match_with`.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// Replaces any failure with a fixed success value.
#[derive(Debug)]
pub struct IfFail<Inner, T> {
    pub(crate) inner: Inner,
    pub(crate) value: T,
}

impl<Inner> Effect for IfFail<Inner, Inner::Output>
where
    Inner: Effect,
    Inner::Output: Clone + Sync,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        match self.inner.run(env).await {
            Ok(value) => Ok(value),
            Err(_) => Ok(self.value.clone()),
        }
    }
}

/// Replaces any failure with a value computed from the error.
pub struct IfFailWith<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for IfFailWith<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IfFailWith")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F> Effect for IfFailWith<Inner, F>
where
    Inner: Effect,
    Inner::Error: Fault,
    F: Fn(Inner::Error) -> Inner::Output + Send + Sync,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        match self.inner.run(env).await {
            Ok(value) => Ok(value),
            Err(error) => call(|| (self.f)(error)),
        }
    }
}

/// Runs a fixed alternative effect on any failure.
#[derive(Debug)]
pub struct IfFailEffect<Inner, Alt> {
    pub(crate) inner: Inner,
    pub(crate) alternative: Alt,
}

impl<Inner, Alt> Effect for IfFailEffect<Inner, Alt>
where
    Inner: Effect,
    Alt: Effect<Output = Inner::Output, Error = Inner::Error, Env = Inner::Env>,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        match self.inner.run(env).await {
            Ok(value) => Ok(value),
            Err(_) => self.alternative.run(env).await,
        }
    }
}

/// Replaces any failure with a fixed error.
#[derive(Debug)]
pub struct ReplaceError<Inner, E> {
    pub(crate) inner: Inner,
    pub(crate) error: E,
}

impl<Inner> Effect for ReplaceError<Inner, Inner::Error>
where
    Inner: Effect,
    Inner::Error: Clone + Sync,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        self.inner.run(env).await.map_err(|_| self.error.clone())
    }
}

/// Folds success and failure into one value.
pub struct Match<Inner, S, F> {
    pub(crate) inner: Inner,
    pub(crate) on_success: S,
    pub(crate) on_failure: F,
}

impl<Inner, S, F> std::fmt::Debug for Match<Inner, S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("inner", &"<effect>")
            .field("on_success", &"<function>")
            .field("on_failure", &"<function>")
            .finish()
    }
}

impl<Inner, S, F, B> Effect for Match<Inner, S, F>
where
    Inner: Effect,
    Inner::Error: Fault,
    S: Fn(Inner::Output) -> B + Send + Sync,
    F: Fn(Inner::Error) -> B + Send + Sync,
    B: Send,
{
    type Output = B;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<B, Self::Error> {
        match self.inner.run(env).await {
            Ok(value) => call(|| (self.on_success)(value)),
            Err(error) => call(|| (self.on_failure)(error)),
        }
    }
}
