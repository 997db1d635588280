//! # Undertow
//!
//! Deferred, cancellable effects with schedule-driven retry and structured
//! recovery.
//!
//! An [`Effect`] describes work without doing it. Effects are composed with
//! combinators, wrapped in retry, repeat or recovery policies, scoped around
//! resources, and only run when handed an environment.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use undertow::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let calls = Arc::new(AtomicU32::new(0));
//! let counter = calls.clone();
//!
//! // Fails twice with a retryable error, then succeeds.
//! let fetch = from_fn(move |_: &Runtime| match counter.fetch_add(1, Ordering::SeqCst) {
//!     0 | 1 => Err(Error::expected(503, "service unavailable")),
//!     _ => Ok("payload"),
//! });
//!
//! let policy = Schedule::exponential(Duration::from_millis(1), 2.0).take(5);
//! let effect = fetch
//!     .retry_while(policy, |e: &Error| e.code() == 503)
//!     .catch_code(404, |_| pure("default"));
//!
//! assert_eq!(effect.run(&Runtime::new()).await, Ok("payload"));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`effect`]: the `Effect` trait, combinators, recovery, retry and resources
//! - [`schedule`]: composable delay sequences driving retry and repeat
//! - [`error`]: the structured [`Error`] and the [`Fault`] capability trait
//! - [`predicate`]: composable predicates, including matchers over errors
//! - [`env`]: execution environments and cancellation
//! - [`testing`]: assertion macros and a recording resource handle
//!
//! ## Features
//!
//! - `tracing`: structured logs from the retry engine and resource release,
//!   plus span instrumentation of effects
//! - `jitter`: randomized schedule combinators
//! - `serde`: serialization of [`Error`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod effect;
pub mod env;
pub mod error;
pub mod predicate;
pub mod schedule;
pub mod semigroup;
pub mod testing;

// Re-exports
pub use effect::{Effect, EffectExt, Fallible};
pub use env::{HasCancel, Runtime};
pub use error::{Error, Fault};
pub use schedule::Schedule;
pub use semigroup::Semigroup;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::effect::prelude::*;
}
