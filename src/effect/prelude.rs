//! Everything needed to build and run effects, in one import.
//!
//! ```rust
//! use undertow::effect::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let effect = pure::<_, Error, ()>(42)
//!     .map(|x| x * 2)
//!     .and_then(|x| pure(x + 1));
//!
//! assert_eq!(effect.execute(&()).await, Ok(85));
//! # });
//! ```
//!
//! The combinator structs themselves live in
//! [`effect::combinators`](crate::effect::combinators) and are only needed
//! when naming types explicitly.

pub use crate::effect::boxed::{BoxFuture, BoxedEffect};
pub use crate::effect::ext::EffectExt;
pub use crate::effect::fallible::{fails, partition, succs, Fallible};
pub use crate::effect::parallel::{apply_all, race, zip_all};
pub use crate::effect::resource::{bracket, use_resource, Release};
pub use crate::effect::retry::{RetryEvent, RetryState};
pub use crate::effect::trait_def::Effect;

pub use crate::effect::constructors::{
    apply, fail, from_async, from_fn, from_option, from_result, pure, raise, zip3,
};

#[cfg(feature = "tracing")]
pub use crate::effect::tracing::EffectTracingExt;

pub use crate::env::{HasCancel, Runtime};
pub use crate::error::{Error, Fault};
pub use crate::predicate::{Predicate, PredicateExt};
pub use crate::schedule::Schedule;
pub use crate::semigroup::Semigroup;
