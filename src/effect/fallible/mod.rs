//! Structured error recovery.
//!
//! [`Fallible`] is implemented for every [`Effect`]. Its core operation is
//! [`catch`](Fallible::catch): run the effect, and if it fails with an error
//! the predicate accepts, run a recovery effect built from that error.
//! Everything else in this module is derived from that shape:
//!
//! | Method | Recovers when | With |
//! |--------|---------------|------|
//! | `catch` | predicate holds | `recover(error)` |
//! | `catch_all` | always | `recover(error)` |
//! | `catch_error` | `error.is(&reference)` | `recover(error)` |
//! | `catch_code` | `error.has_code(code)` | `recover(error)` |
//! | `catch_exception` | native payload matches | `recover(error)` |
//! | `if_fail` | always | a fixed value |
//! | `if_fail_with` | always | `f(error)` |
//! | `if_fail_effect` | always | a fixed effect |
//! | `replace_error` | always | a fixed error |
//!
//! The "always" forms also see cancellation. Put a
//! [`cancelled()`](crate::predicate::cancelled)`.not()` predicate in front
//! with `catch` if a recovery must not swallow it.
//!
//! [`partition`], [`fails`] and [`succs`] run a whole collection of effects
//! and split the outcomes without short-circuiting.
//!
//! # Example
//!
//! ```rust
//! use undertow::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let lookup = fail::<&str, _, ()>(Error::expected(404, "no such user"))
//!     .catch_code(404, |_| pure("guest"))
//!     .catch_code(503, |_| pure("retry later"));
//! assert_eq!(lookup.run(&()).await, Ok("guest"));
//! # });
//! ```

mod catch;
mod partition;
mod substitute;

use std::error::Error as StdError;

pub use catch::Catch;
pub use partition::{fails, partition, succs, Partition};
pub use substitute::{IfFail, IfFailEffect, IfFailWith, Match, ReplaceError};

use crate::effect::trait_def::Effect;
use crate::error::{Error, Fault};
use crate::predicate::{Always, Exception, HasCode, IsError, Predicate};

/// Selective recovery for effects.
pub trait Fallible: Effect {
    /// Recover from failures accepted by `predicate`.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let effect = fail::<i32, _, ()>(Error::new("miss"))
    ///     .catch(|e: &Error| e.message() == "miss", |_| pure(0));
    /// assert_eq!(effect.run(&()).await, Ok(0));
    ///
    /// let untouched = fail::<i32, _, ()>(Error::new("miss"))
    ///     .catch(|_: &Error| false, |_| pure(0));
    /// assert_eq!(untouched.run(&()).await, Err(Error::new("miss")));
    /// # });
    /// ```
    fn catch<P, F, R>(self, predicate: P, recover: F) -> Catch<Self, P, F>
    where
        Self::Error: Fault,
        P: Predicate<Self::Error>,
        F: Fn(Self::Error) -> R + Send + Sync,
        R: Effect<Output = Self::Output, Error = Self::Error, Env = Self::Env>,
    {
        Catch::new(self, predicate, recover)
    }

    /// Recover from every failure.
    fn catch_all<F, R>(self, recover: F) -> Catch<Self, Always, F>
    where
        Self::Error: Fault,
        F: Fn(Self::Error) -> R + Send + Sync,
        R: Effect<Output = Self::Output, Error = Self::Error, Env = Self::Env>,
    {
        Catch::new(self, Always, recover)
    }

    /// Recover from failures equivalent to `reference` under [`Error::is`].
    fn catch_error<F, R>(self, reference: Error, recover: F) -> Catch<Self, IsError, F>
    where
        Self: Effect<Error = Error>,
        F: Fn(Error) -> R + Send + Sync,
        R: Effect<Output = Self::Output, Error = Error, Env = Self::Env>,
    {
        Catch::new(self, IsError(reference), recover)
    }

    /// Recover from failures carrying `code`.
    fn catch_code<F, R>(self, code: i32, recover: F) -> Catch<Self, HasCode, F>
    where
        Self: Effect<Error = Error>,
        F: Fn(Error) -> R + Send + Sync,
        R: Effect<Output = Self::Output, Error = Error, Env = Self::Env>,
    {
        Catch::new(self, HasCode(code), recover)
    }

    /// Recover from failures whose native payload satisfies `predicate`.
    ///
    /// ```rust
    /// use std::io;
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let read = from_fn(|_: &()| -> Result<String, Error> {
    ///     Err(io::Error::new(io::ErrorKind::NotFound, "settings.json").into())
    /// })
    /// .catch_exception(
    ///     |e| e.downcast_ref::<io::Error>().is_some_and(|e| e.kind() == io::ErrorKind::NotFound),
    ///     |_| pure(String::from("{}")),
    /// );
    /// assert_eq!(read.run(&()).await, Ok("{}".to_string()));
    /// # });
    /// ```
    fn catch_exception<P, F, R>(self, predicate: P, recover: F) -> Catch<Self, Exception<P>, F>
    where
        Self: Effect<Error = Error>,
        P: Fn(&(dyn StdError + Send + Sync + 'static)) -> bool + Send + Sync,
        F: Fn(Error) -> R + Send + Sync,
        R: Effect<Output = Self::Output, Error = Error, Env = Self::Env>,
    {
        Catch::new(self, Exception(predicate), recover)
    }

    /// Replace any failure with `value`.
    fn if_fail(self, value: Self::Output) -> IfFail<Self, Self::Output>
    where
        Self::Output: Clone + Sync,
    {
        IfFail { inner: self, value }
    }

    /// Replace any failure with a value computed from the error.
    fn if_fail_with<F>(self, f: F) -> IfFailWith<Self, F>
    where
        Self::Error: Fault,
        F: Fn(Self::Error) -> Self::Output + Send + Sync,
    {
        IfFailWith { inner: self, f }
    }

    /// Run `alternative` instead on any failure.
    fn if_fail_effect<Alt>(self, alternative: Alt) -> IfFailEffect<Self, Alt>
    where
        Alt: Effect<Output = Self::Output, Error = Self::Error, Env = Self::Env>,
    {
        IfFailEffect {
            inner: self,
            alternative,
        }
    }

    /// Replace any failure with `error`.
    fn replace_error(self, error: Self::Error) -> ReplaceError<Self, Self::Error>
    where
        Self::Error: Clone + Sync,
    {
        ReplaceError { inner: self, error }
    }

    /// Fold both outcomes into one value.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let status = fail::<u32, _, ()>(Error::expected(500, "boom"))
    ///     .match_with(|n| format!("ok {n}"), |e| format!("failed {}", e.code()));
    /// assert_eq!(status.run(&()).await, Ok("failed 500".to_string()));
    /// # });
    /// ```
    fn match_with<S, F, B>(self, on_success: S, on_failure: F) -> Match<Self, S, F>
    where
        Self::Error: Fault,
        S: Fn(Self::Output) -> B + Send + Sync,
        F: Fn(Self::Error) -> B + Send + Sync,
        B: Send,
    {
        Match {
            inner: self,
            on_success,
            on_failure,
        }
    }
}

impl<T: Effect> Fallible for T {}
