//! Timeout combinator - bounds how long an effect may run.

use std::time::Duration;

use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// Fails with `E::timed_out(duration)` if the inner effect has not finished
/// within `duration`. The inner run is dropped at that point.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let slow = from_async(|_: &()| async {
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     Ok::<_, Error>(())
/// });
/// let err = slow.timeout(Duration::from_millis(10)).run(&()).await.unwrap_err();
/// assert!(err.is_timed_out());
/// # });
/// ```
#[derive(Debug)]
pub struct Timeout<Inner> {
    pub(crate) inner: Inner,
    pub(crate) duration: Duration,
}

impl<Inner> Effect for Timeout<Inner>
where
    Inner: Effect,
    Inner::Error: Fault,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        match tokio::time::timeout(self.duration, self.inner.run(env)).await {
            Ok(result) => result,
            Err(_) => Err(Fault::timed_out(self.duration)),
        }
    }
}
