//! Combinator types for effect composition.
//!
//! This module contains the concrete types returned by effect constructors
//! and combinators. They store their parts inline and do not allocate.
//!
//! Most users won't need to work with these types directly. Instead,
//! use the combinator methods on `EffectExt` which return these types
//! behind `impl Effect<...>`.

mod and_then;
mod apply;
mod fail;
mod filter;
mod from_async;
mod from_fn;
mod from_result;
mod map;
mod map_err;
mod or_else;
mod pure;
mod tap;
mod timeout;
mod zip;
mod zip_with;

pub use and_then::AndThen;
pub use apply::Apply;
pub use fail::Fail;
pub use filter::Filter;
pub use from_async::FromAsync;
pub use from_fn::FromFn;
pub use from_result::FromResult;
pub use map::Map;
pub use map_err::MapErr;
pub use or_else::OrElse;
pub use pure::Pure;
pub use tap::Tap;
pub use timeout::Timeout;
pub use zip::{Zip, Zip3};
pub use zip_with::ZipWith;

pub(crate) use zip::first_error;
