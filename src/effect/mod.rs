//! Deferred, cancellable computations.
//!
//! An [`Effect`] is a description of work: building one never executes
//! anything. Running it against an environment with [`Effect::run`] performs
//! the work and produces a `Result`. Because `run` takes `&self`, the same
//! effect can be run any number of times, and each run starts from scratch.
//!
//! # Building effects
//!
//! | Constructor | Produces |
//! |-------------|----------|
//! | [`pure`] / [`fail`] / [`raise`] | a fixed success or failure |
//! | [`from_fn`] | a synchronous closure over the environment |
//! | [`from_async`] | an async closure over the environment |
//! | [`from_result`] / [`from_option`] | an existing value |
//!
//! Combinators on [`EffectExt`] transform and sequence effects; [`Fallible`]
//! adds selective recovery; [`apply`], [`zip3`] and the functions in
//! [`parallel`] run effects concurrently.
//!
//! # Failure and cancellation
//!
//! Effects that call user code turn panics into `E::panicked`, and observe the
//! environment's cancellation token (see [`HasCancel`](crate::env::HasCancel)):
//! a cancelled environment makes [`from_fn`] and [`from_async`] fail with
//! `E::cancelled()` instead of calling the closure, and interrupts a pending
//! [`from_async`] future.
//!
//! ```rust
//! use undertow::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let rt = Runtime::new();
//! let effect = from_fn(|_: &Runtime| Ok::<_, Error>("ran"));
//! assert_eq!(effect.run(&rt).await, Ok("ran"));
//!
//! rt.cancel();
//! assert_eq!(effect.run(&rt).await, Err(Error::cancelled()));
//! # });
//! ```
//!
//! # Boxing
//!
//! Combinators return concrete nested types without allocating. Call
//! [`boxed`](EffectExt::boxed) to erase the type when effects have to be
//! stored together, returned from different match arms, or built recursively.

pub mod boxed;
pub mod combinators;
pub mod constructors;
pub mod ext;
pub mod fallible;
mod guard;
pub mod parallel;
pub mod prelude;
pub mod repeat;
pub mod resource;
pub mod retry;
#[cfg(feature = "tracing")]
pub mod tracing;
mod trait_def;

pub use trait_def::Effect;

pub use ext::EffectExt;

pub use boxed::{BoxFuture, BoxedEffect};

pub use combinators::{
    AndThen, Apply, Fail, Filter, FromAsync, FromFn, FromResult, Map, MapErr, OrElse, Pure, Tap,
    Timeout, Zip, Zip3, ZipWith,
};

pub use constructors::{
    apply, fail, from_async, from_fn, from_option, from_result, pure, raise, zip3,
};

pub use fallible::{fails, partition, succs, Catch, Fallible, Partition};

pub use parallel::{apply_all, race, zip_all, ApplyAll, Race, ZipAll};

pub use repeat::{Reduce, Repeat};

pub use resource::{bracket, use_resource, Bracket, Release};

pub use retry::{Retry, RetryEvent, RetryState};

#[cfg(feature = "tracing")]
pub use self::tracing::{EffectTracingExt, Instrument};
