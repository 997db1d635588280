//! Composable predicates for selecting which failures to recover from.
//!
//! [`Fallible::catch`](crate::effect::Fallible::catch) takes a predicate over
//! the error type. Any `Fn(&E) -> bool` closure works, and this module adds a
//! set of ready-made matchers for [`Error`](crate::Error) that can be combined
//! with `and`, `or` and `not`.
//!
//! # Example
//!
//! ```rust
//! use undertow::predicate::*;
//! use undertow::Error;
//!
//! let transient = has_code(503).or(has_code(429)).and(cancelled().not());
//!
//! assert!(transient.check(&Error::expected(503, "unavailable")));
//! assert!(!transient.check(&Error::expected(404, "not found")));
//! assert!(!transient.check(&Error::cancelled()));
//! ```

mod combinators;
mod error;

pub use combinators::{Always, And, Not, Or, Predicate, PredicateExt};
pub use error::{
    any_error, cancelled, exception, exceptional, expected, has_code, is_error, native, Cancelled,
    Exception, Exceptional, Expected, HasCode, IsError, Native,
};
