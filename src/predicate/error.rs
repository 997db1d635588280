//! Matchers over [`Error`].

use std::error::Error as StdError;
use std::marker::PhantomData;

use super::{Always, Predicate};
use crate::Error;

/// Match every error, cancellation included.
pub fn any_error() -> Always {
    Always
}

/// Matches errors that carry a code, searching aggregates and causes.
#[derive(Clone, Copy, Debug)]
pub struct HasCode(pub i32);

impl Predicate<Error> for HasCode {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.has_code(self.0)
    }
}

/// Match errors carrying `code`.
///
/// ```rust
/// use undertow::predicate::*;
/// use undertow::Error;
///
/// let both = Error::expected(1, "a") + Error::expected(2, "b");
/// assert!(has_code(2).check(&both));
/// ```
pub fn has_code(code: i32) -> HasCode {
    HasCode(code)
}

/// Matches errors for which [`Error::is`] holds against a reference error.
#[derive(Clone, Debug)]
pub struct IsError(pub Error);

impl Predicate<Error> for IsError {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.is(&self.0)
    }
}

/// Match errors equivalent to `reference` under [`Error::is`].
pub fn is_error(reference: Error) -> IsError {
    IsError(reference)
}

/// Matches expected errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct Expected;

impl Predicate<Error> for Expected {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.is_expected()
    }
}

/// Match expected errors.
pub fn expected() -> Expected {
    Expected
}

/// Matches exceptional errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exceptional;

impl Predicate<Error> for Exceptional {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.is_exceptional()
    }
}

/// Match exceptional errors.
pub fn exceptional() -> Exceptional {
    Exceptional
}

/// Matches cancellation-class errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cancelled;

impl Predicate<Error> for Cancelled {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.is_cancelled()
    }
}

/// Match cancellation-class errors, including the filter rejection error.
pub fn cancelled() -> Cancelled {
    Cancelled
}

/// Matches errors wrapping a native payload accepted by a predicate.
#[derive(Clone, Copy, Debug)]
pub struct Exception<P>(pub P);

impl<P> Predicate<Error> for Exception<P>
where
    P: Fn(&(dyn StdError + Send + Sync + 'static)) -> bool + Send + Sync,
{
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.native().is_some_and(|native| (self.0)(native))
    }
}

/// Match errors whose native payload satisfies `predicate`.
///
/// Errors without a payload never match.
pub fn exception<P>(predicate: P) -> Exception<P>
where
    P: Fn(&(dyn StdError + Send + Sync + 'static)) -> bool + Send + Sync,
{
    Exception(predicate)
}

/// Matches errors whose native payload is a `T`.
pub struct Native<T>(PhantomData<fn() -> T>);

impl<T> Clone for Native<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Native<T> {}

impl<T> std::fmt::Debug for Native<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Native<{}>", std::any::type_name::<T>())
    }
}

impl<T: StdError + 'static> Predicate<Error> for Native<T> {
    #[inline]
    fn check(&self, error: &Error) -> bool {
        error.downcast_ref::<T>().is_some()
    }
}

/// Match errors wrapping a native `T`.
///
/// ```rust
/// use undertow::predicate::*;
/// use undertow::Error;
///
/// let err = Error::from_error(std::io::Error::other("socket closed"));
/// assert!(native::<std::io::Error>().check(&err));
/// assert!(!native::<std::fmt::Error>().check(&err));
/// ```
pub fn native<T: StdError + 'static>() -> Native<T> {
    Native(PhantomData)
}
