//! Structured errors produced by running effects.
//!
//! [`Error`] distinguishes four kinds of failure:
//!
//! - **Expected**: domain failures callers are expected to match on and
//!   recover from (not found, validation, ...).
//! - **Exceptional**: unanticipated faults, usually wrapping a native
//!   `std::error::Error` or a panic caught at a user-closure boundary.
//! - **Cancelled**: cooperative cancellation. Never retried.
//! - **Many**: an aggregate, produced when concurrent branches fail together.
//!
//! Errors combine with `+` (or [`Semigroup::combine`]) into a flat aggregate:
//!
//! ```
//! use undertow::Error;
//!
//! let e = Error::expected(404, "user not found") + Error::expected(503, "cache down");
//! assert!(e.is_many());
//! assert!(e.has_code(404));
//! assert!(e.is(&Error::expected(503, "anything")));
//! ```
//!
//! Generic effect code does not name `Error` directly. It asks for the
//! capabilities it needs through the [`Fault`] trait, which `Error`
//! implements.

use std::any::Any;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::ops::Add;
use std::sync::Arc;
use std::time::Duration;

use crate::semigroup::Semigroup;

/// Well-known error codes.
///
/// User codes should stay non-negative; the library reserves the negative
/// range below `-2_000_000_000`.
pub mod codes {
    /// No code. Expected errors built with [`Error::new`](super::Error::new) use it.
    pub const NONE: i32 = 0;
    /// Cooperative cancellation.
    pub const CANCELLED: i32 = -2_000_000_001;
    /// An operation exceeded its time budget.
    pub const TIMED_OUT: i32 = -2_000_000_002;
    /// A user closure panicked.
    pub const PANICKED: i32 = -2_000_000_003;
    /// Aggregate of several errors.
    pub const MANY: i32 = -2_000_000_004;
    /// A value was rejected by `filter`.
    pub const FILTERED: i32 = -2_000_000_005;
    /// A wrapped native error with no more specific code.
    pub const EXCEPTIONAL: i32 = -2_000_000_006;
}

/// Native error payload carried by exceptional errors.
pub type NativeError = Arc<dyn StdError + Send + Sync + 'static>;

/// A structured failure value.
#[derive(Debug, Clone)]
pub enum Error {
    /// An anticipated, domain-level failure.
    Expected {
        /// Numeric code, [`codes::NONE`] when unset.
        code: i32,
        /// Human readable message.
        message: String,
        /// Underlying cause.
        inner: Option<Box<Error>>,
    },
    /// An unanticipated fault.
    Exceptional {
        /// Numeric code.
        code: i32,
        /// Human readable message.
        message: String,
        /// Wrapped native error, if the fault originated from one.
        source: Option<NativeError>,
        /// Underlying cause.
        inner: Option<Box<Error>>,
    },
    /// Cooperative cancellation.
    Cancelled,
    /// The operation did not finish within the given duration.
    TimedOut(Duration),
    /// Several errors that occurred together.
    Many(Vec<Error>),
}

impl Error {
    /// Create an expected error with no code.
    pub fn new(message: impl Into<String>) -> Self {
        Error::Expected {
            code: codes::NONE,
            message: message.into(),
            inner: None,
        }
    }

    /// Create an expected error with a code.
    pub fn expected(code: i32, message: impl Into<String>) -> Self {
        Error::Expected {
            code,
            message: message.into(),
            inner: None,
        }
    }

    /// Create an exceptional error that carries no native payload.
    pub fn exceptional(message: impl Into<String>) -> Self {
        Error::Exceptional {
            code: codes::EXCEPTIONAL,
            message: message.into(),
            source: None,
            inner: None,
        }
    }

    /// Wrap a native error as an exceptional failure.
    ///
    /// ```
    /// use undertow::Error;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
    /// let err = Error::from_error(io);
    /// assert!(err.is_exceptional());
    /// assert!(err.downcast_ref::<std::io::Error>().is_some());
    /// ```
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Exceptional {
            code: codes::EXCEPTIONAL,
            message: error.to_string(),
            source: Some(Arc::new(error)),
            inner: None,
        }
    }

    /// Create the error reported when a user closure panics.
    pub fn panicked(message: impl Into<String>) -> Self {
        Error::Exceptional {
            code: codes::PANICKED,
            message: message.into(),
            source: None,
            inner: None,
        }
    }

    /// The cancellation error.
    pub fn cancelled() -> Self {
        Error::Cancelled
    }

    /// The error produced when an operation exceeds `after`.
    pub fn timed_out(after: Duration) -> Self {
        Error::TimedOut(after)
    }

    /// The error produced when `filter` rejects a value.
    ///
    /// It belongs to the cancellation class: [`Error::is_cancelled`] is true.
    pub fn filtered() -> Self {
        Error::Expected {
            code: codes::FILTERED,
            message: "value rejected by filter".to_string(),
            inner: None,
        }
    }

    /// Build an aggregate from several errors.
    ///
    /// Nested aggregates are flattened and a single error is returned as is.
    /// An empty input yields an empty aggregate: code [`codes::MANY`], message
    /// `"no errors"`, and an empty [`errors`](Error::errors) slice. Combining
    /// it with another error leaves just that error.
    pub fn many(errors: impl IntoIterator<Item = Error>) -> Self {
        let mut flat = Vec::new();
        for error in errors {
            match error {
                Error::Many(nested) => flat.extend(nested),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Error::Many(flat)
        }
    }

    /// Attach an underlying cause.
    ///
    /// Has no effect on cancellation, timeout, or aggregate errors.
    pub fn with_inner(mut self, cause: Error) -> Self {
        match &mut self {
            Error::Expected { inner, .. } | Error::Exceptional { inner, .. } => {
                *inner = Some(Box::new(cause));
            }
            Error::Cancelled | Error::TimedOut(_) | Error::Many(_) => {}
        }
        self
    }

    /// Wrap this error as the cause of a new expected error.
    ///
    /// ```
    /// use undertow::Error;
    ///
    /// let err = Error::expected(2, "connection refused").context("loading profile");
    /// assert_eq!(err.message(), "loading profile");
    /// assert_eq!(err.inner().map(|e| e.code()), Some(2));
    /// assert!(err.is(&Error::expected(2, "")));
    /// ```
    pub fn context(self, message: impl Into<String>) -> Self {
        Error::Expected {
            code: codes::NONE,
            message: message.into(),
            inner: Some(Box::new(self)),
        }
    }

    /// The numeric code of this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::Expected { code, .. } | Error::Exceptional { code, .. } => *code,
            Error::Cancelled => codes::CANCELLED,
            Error::TimedOut(_) => codes::TIMED_OUT,
            Error::Many(_) => codes::MANY,
        }
    }

    /// The human readable message of this error.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Error::Expected { message, .. } | Error::Exceptional { message, .. } => {
                Cow::Borrowed(message)
            }
            Error::Cancelled => Cow::Borrowed("operation cancelled"),
            Error::TimedOut(after) => Cow::Owned(format!("operation timed out after {after:?}")),
            Error::Many(errors) if errors.is_empty() => Cow::Borrowed("no errors"),
            Error::Many(errors) => Cow::Owned(
                errors
                    .iter()
                    .map(|e| e.message().into_owned())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }

    /// The underlying cause, if any.
    pub fn inner(&self) -> Option<&Error> {
        match self {
            Error::Expected { inner, .. } | Error::Exceptional { inner, .. } => inner.as_deref(),
            _ => None,
        }
    }

    /// The errors held by this value.
    ///
    /// An aggregate yields its members; any other error yields itself.
    pub fn errors(&self) -> &[Error] {
        match self {
            Error::Many(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }

    /// The wrapped native error, if any.
    pub fn native(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Error::Exceptional {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Downcast the wrapped native error.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.native()?.downcast_ref::<T>()
    }

    /// True for expected errors.
    pub fn is_expected(&self) -> bool {
        matches!(self, Error::Expected { .. })
    }

    /// True for exceptional errors, including caught panics.
    pub fn is_exceptional(&self) -> bool {
        matches!(self, Error::Exceptional { .. })
    }

    /// True for cancellation-class errors: cancellation and filter rejection.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled) || self.code() == codes::FILTERED
    }

    /// True for timeouts.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Error::TimedOut(_))
    }

    /// True for aggregates.
    pub fn is_many(&self) -> bool {
        matches!(self, Error::Many(_))
    }

    /// Whether this error, an aggregate member, or an inner cause carries `code`.
    pub fn has_code(&self, code: i32) -> bool {
        self.code() == code
            || match self {
                Error::Many(errors) => errors.iter().any(|e| e.has_code(code)),
                _ => self.inner().is_some_and(|inner| inner.has_code(code)),
            }
    }

    /// Whether this error *is* `other`.
    ///
    /// Two plain errors match on code, or on message when both codes are
    /// [`codes::NONE`]. An aggregate on either side matches when any member
    /// does, and an error matches anything its inner cause matches.
    pub fn is(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Many(errors), _) => errors.iter().any(|e| e.is(other)),
            (_, Error::Many(errors)) => errors.iter().any(|e| self.is(e)),
            _ => {
                let same = if self.code() == codes::NONE && other.code() == codes::NONE {
                    self.message() == other.message()
                } else {
                    self.code() == other.code()
                };
                same || self.inner().is_some_and(|inner| inner.is(other))
            }
        }
    }

    #[cfg(feature = "serde")]
    fn kind_name(&self) -> &'static str {
        match self {
            Error::Expected { .. } => "expected",
            Error::Exceptional { .. } => "exceptional",
            Error::Cancelled => "cancelled",
            Error::TimedOut(_) => "timed_out",
            Error::Many(_) => "many",
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Error::Expected {
                    code: c1,
                    message: m1,
                    inner: i1,
                },
                Error::Expected {
                    code: c2,
                    message: m2,
                    inner: i2,
                },
            ) => c1 == c2 && m1 == m2 && i1 == i2,
            (
                Error::Exceptional {
                    code: c1,
                    message: m1,
                    inner: i1,
                    ..
                },
                Error::Exceptional {
                    code: c2,
                    message: m2,
                    inner: i2,
                    ..
                },
            ) => c1 == c2 && m1 == m2 && i1 == i2,
            (Error::Cancelled, Error::Cancelled) => true,
            (Error::TimedOut(a), Error::TimedOut(b)) => a == b,
            (Error::Many(a), Error::Many(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Many(errors) if errors.is_empty() => write!(f, "no errors"),
            Error::Many(errors) => {
                write!(f, "{} errors: ", errors.len())?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            other => {
                write!(f, "{}", other.message())?;
                if let Some(inner) = other.inner() {
                    write!(f, ": {inner}")?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        if let Some(native) = self.native() {
            return Some(native);
        }
        self.inner().map(|inner| inner as &(dyn StdError + 'static))
    }
}

impl Semigroup for Error {
    fn combine(self, other: Self) -> Self {
        Error::many([self, other])
    }
}

impl Add for Error {
    type Output = Error;

    fn add(self, rhs: Error) -> Error {
        self.combine(rhs)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::new(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::new(message)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::from_error(error)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let members: &[Error] = match self {
            Error::Many(errors) => errors,
            _ => &[],
        };
        let mut state = serializer.serialize_struct("Error", 5)?;
        state.serialize_field("kind", self.kind_name())?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("inner", &self.inner())?;
        state.serialize_field("errors", members)?;
        state.end()
    }
}

/// Failure capabilities the engine needs from an error type.
///
/// Generic combinators that must manufacture or recognise cancellation,
/// timeouts, or caught panics bound their error type on `Fault`.
pub trait Fault: Send + Sized {
    /// The cancellation error.
    fn cancelled() -> Self;

    /// The error produced when `filter` rejects a value.
    fn filtered() -> Self {
        Self::cancelled()
    }

    /// The error produced when an operation exceeds `after`.
    fn timed_out(after: Duration) -> Self;

    /// The error produced when a user closure panics.
    fn panicked(message: String) -> Self;

    /// Whether this error belongs to the cancellation class.
    fn is_cancelled(&self) -> bool;
}

impl Fault for Error {
    fn cancelled() -> Self {
        Error::Cancelled
    }

    fn filtered() -> Self {
        Error::filtered()
    }

    fn timed_out(after: Duration) -> Self {
        Error::TimedOut(after)
    }

    fn panicked(message: String) -> Self {
        Error::panicked(message)
    }

    fn is_cancelled(&self) -> bool {
        Error::is_cancelled(self)
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
