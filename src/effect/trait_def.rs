//! Effect trait definition - the core abstraction.
//!
//! An `Effect` is a *description* of a computation that:
//! - Produces a value of type `Output` on success
//! - May fail with an error of type `Error`
//! - Runs against an environment of type `Env`
//!
//! Building an effect never executes anything. Running it executes the whole
//! graph, and because `run` takes `&self`, the same effect can be run any
//! number of times. Each run starts from scratch: nothing is memoized.
//!
//! # Design
//!
//! This trait follows the same pattern as `Future` and `Iterator`:
//! - Combinators return concrete types (no boxing in the common case)
//! - Use `.boxed()` when you need type erasure
//!
//! # Environment
//!
//! The environment carries dependencies and the cancellation signal. It must
//! implement [`HasCancel`](crate::env::HasCancel); `()` does, for effects
//! that need neither. `Clone` is required so boxed effects can own a copy,
//! which is cheap when the environment wraps its resources in `Arc`:
//!
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use undertow::env::HasCancel;
//!
//! struct Pool;
//!
//! #[derive(Clone)]
//! struct AppEnv {
//!     db: Arc<Pool>,
//!     shutdown: CancellationToken,
//! }
//!
//! impl HasCancel for AppEnv {
//!     fn cancel_token(&self) -> Option<&CancellationToken> {
//!         Some(&self.shutdown)
//!     }
//! }
//! ```

use std::future::Future;

use crate::env::HasCancel;

/// The core Effect trait - a deferred, re-runnable computation.
///
/// # Type Parameters
///
/// * `Output` - The success type produced by this effect
/// * `Error` - The error type that may be produced
/// * `Env` - The environment this effect runs against
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = pure::<_, Error, ()>(20).map(|x| x + 1).map(|x| x * 2);
///
/// // Running twice re-executes the pipeline.
/// assert_eq!(effect.run(&()).await, Ok(42));
/// assert_eq!(effect.run(&()).await, Ok(42));
/// # });
/// ```
pub trait Effect: Sized + Send + Sync {
    /// The success type produced by this effect.
    type Output: Send;

    /// The error type that may be produced.
    type Error: Send;

    /// The environment type required to run this effect.
    type Env: HasCancel + Clone + Send + Sync;

    /// Execute this effect with the given environment.
    ///
    /// Resolves to `Ok(output)` on success or `Err(error)` on failure. Failures
    /// raised by user code, including panics inside closures the library
    /// invokes, are reported through the `Err` side.
    fn run(&self, env: &Self::Env)
        -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}
