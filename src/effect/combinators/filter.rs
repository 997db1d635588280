//! Filter combinator - rejects values that fail a predicate.

use crate::effect::guard::call;
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// Filter combinator - passes the value through if the predicate accepts
/// it, otherwise fails with `E::filtered()`.
///
/// The rejection error belongs to the cancellation class, so the retry
/// engine treats it as terminal.
///
/// # Example
///
/// ```rust
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let even = |n: i32| pure::<_, Error, ()>(n).filter(|x| x % 2 == 0);
/// assert_eq!(even(4).run(&()).await, Ok(4));
/// assert!(even(3).run(&()).await.unwrap_err().is_cancelled());
/// # });
/// ```
pub struct Filter<Inner, P> {
    pub(crate) inner: Inner,
    pub(crate) predicate: P,
}

impl<Inner, P> std::fmt::Debug for Filter<Inner, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("inner", &"<effect>")
            .field("predicate", &"<function>")
            .finish()
    }
}

impl<Inner, P> Effect for Filter<Inner, P>
where
    Inner: Effect,
    Inner::Error: Fault,
    P: Fn(&Inner::Output) -> bool + Send + Sync,
{
    type Output = Inner::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let value = self.inner.run(env).await?;
        if call::<Self::Error, _>(|| (self.predicate)(&value))? {
            Ok(value)
        } else {
            Err(Fault::filtered())
        }
    }
}
