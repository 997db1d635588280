//! The boundary where user code is invoked.
//!
//! Every closure or future supplied by a caller runs through one of these
//! helpers, which turn panics into `E::panicked` and observe the
//! environment's cancellation signal.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::pin;
use std::time::Duration;

use futures::future::{select, Either};
use futures::FutureExt;

use crate::env::HasCancel;
use crate::error::{panic_message, Fault};

/// Invoke a synchronous user closure, unless cancellation was requested.
pub(crate) fn invoke<E, R>(
    env: &(impl HasCancel + ?Sized),
    f: impl FnOnce() -> R,
) -> Result<R, E>
where
    E: Fault,
{
    if env.is_cancelled() {
        return Err(E::cancelled());
    }
    call(f)
}

/// Invoke a user closure, converting a panic into `E::panicked`.
pub(crate) fn call<E, R>(f: impl FnOnce() -> R) -> Result<R, E>
where
    E: Fault,
{
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| E::panicked(panic_message(payload)))
}

/// Await a user future, racing it against cancellation.
///
/// Cancellation drops the future and yields `E::cancelled()`.
pub(crate) async fn guarded<Env, T, E, Fut>(env: &Env, fut: Fut) -> Result<T, E>
where
    Env: HasCancel + ?Sized,
    E: Fault,
    Fut: Future<Output = Result<T, E>>,
{
    let work = AssertUnwindSafe(fut).catch_unwind();
    let outcome = match env.cancel_token() {
        None => work.await,
        Some(token) => match select(pin!(work), pin!(token.cancelled())).await {
            Either::Left((outcome, _)) => outcome,
            Either::Right(((), _)) => return Err(E::cancelled()),
        },
    };
    outcome.unwrap_or_else(|payload| Err(E::panicked(panic_message(payload))))
}

/// Await a user future to completion, converting a panic into
/// `E::panicked`. Cancellation is not observed.
pub(crate) async fn shielded<T, E, Fut>(fut: Fut) -> Result<T, E>
where
    E: Fault,
    Fut: Future<Output = Result<T, E>>,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(E::panicked(panic_message(payload))))
}

/// Sleep for `delay` unless cancellation is requested first.
///
/// Returns `false` if the wait was cut short by cancellation.
pub(crate) async fn wait<Env>(env: &Env, delay: Duration) -> bool
where
    Env: HasCancel + ?Sized,
{
    if env.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    match env.cancel_token() {
        None => {
            tokio::time::sleep(delay).await;
            true
        }
        Some(token) => matches!(
            select(pin!(tokio::time::sleep(delay)), pin!(token.cancelled())).await,
            Either::Left(_)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Runtime;
    use crate::Error;
    use std::time::Duration;

    #[test]
    fn test_invoke_converts_panics() {
        let result: Result<i32, Error> = invoke(&(), || panic!("kaboom"));
        let err = result.unwrap_err();
        assert!(err.is_exceptional());
        assert!(err.message().contains("kaboom"));
    }

    #[test]
    fn test_invoke_skips_closure_when_cancelled() {
        let rt = Runtime::new();
        rt.cancel();
        let result: Result<(), Error> = invoke(&rt, || unreachable!());
        assert_eq!(result, Err(Error::cancelled()));
    }

    #[tokio::test]
    async fn test_guarded_observes_cancellation() {
        let rt = Runtime::new();
        let trigger = rt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            trigger.cancel();
        });
        let result: Result<(), Error> = guarded(&rt, std::future::pending()).await;
        assert_eq!(result, Err(Error::cancelled()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_cut_short_by_cancellation() {
        let rt = Runtime::new();
        let trigger = rt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });
        let started = tokio::time::Instant::now();
        assert!(!wait(&rt, Duration::from_secs(3600)).await);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_completes_without_token() {
        assert!(wait(&(), Duration::from_secs(60)).await);
    }
}
