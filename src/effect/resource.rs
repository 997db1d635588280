//! Scoped resource acquisition with guaranteed release.
//!
//! A resource is acquired by an effect, handed by reference to a `use`
//! function that builds the effect working with it, and then released. The
//! protocol is the same whichever way the release step is supplied:
//!
//! - if acquisition fails, nothing is used and nothing is released;
//! - otherwise the release step runs exactly once, after the use effect has
//!   finished, whether it succeeded, failed, panicked or was cancelled;
//! - a use failure wins over a release failure, which is then logged;
//! - a release failure is reported only when the use effect succeeded.
//!
//! If the running future is dropped while the resource is held (for example
//! by an enclosing timeout), the release step is spawned on the current tokio
//! runtime instead. A release that was already under way when the drop
//! happened is spawned too, and runs to completion.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use undertow::prelude::*;
//!
//! struct Connection {
//!     closed: Arc<AtomicBool>,
//! }
//!
//! impl Release for Connection {
//!     type Error = Error;
//!
//!     async fn release(self) -> Result<(), Error> {
//!         self.closed.store(true, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let closed = Arc::new(AtomicBool::new(false));
//! let flag = closed.clone();
//! let effect = use_resource(
//!     from_fn(move |_: &()| Ok::<_, Error>(Connection { closed: flag.clone() })),
//!     |_conn: &Connection| fail::<i32, _, ()>(Error::new("query failed")),
//! );
//!
//! assert_eq!(effect.run(&()).await, Err(Error::new("query failed")));
//! assert!(closed.load(Ordering::SeqCst));
//! # });
//! ```

use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use crate::effect::boxed::BoxFuture;
use crate::effect::guard::{call, shielded};
use crate::effect::trait_def::Effect;
use crate::error::Fault;

/// A handle that knows how to give back what it holds.
///
/// `release` consumes the handle, so a released handle cannot be used again.
pub trait Release: Send + Sized + 'static {
    /// The failure reported when releasing does not succeed.
    type Error: Send + 'static;

    /// Release the resource.
    fn release(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// The release step used by [`use_resource`].
pub type ReleaseFn<H, E> = fn(H) -> BoxFuture<'static, Result<(), E>>;

fn release_handle<H: Release>(handle: H) -> BoxFuture<'static, Result<(), H::Error>> {
    Box::pin(handle.release())
}

/// Acquire, use, and release a resource.
///
/// Created by [`bracket`] and [`use_resource`].
pub struct Bracket<Acquire, Rel, Use> {
    acquire: Acquire,
    release: Arc<Rel>,
    use_fn: Use,
}

impl<Acquire, Rel, Use> std::fmt::Debug for Bracket<Acquire, Rel, Use> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bracket")
            .field("acquire", &"<effect>")
            .field("release", &"<function>")
            .field("use_fn", &"<function>")
            .finish()
    }
}

impl<Acquire, Rel, Use, UseEffect, H, RelFut> Effect for Bracket<Acquire, Rel, Use>
where
    Acquire: Effect<Output = H>,
    Acquire::Error: Fault + Debug + 'static,
    H: Send + 'static,
    Use: Fn(&H) -> UseEffect + Send + Sync,
    UseEffect: Effect<Error = Acquire::Error, Env = Acquire::Env>,
    Rel: Fn(H) -> RelFut + Send + Sync + 'static,
    RelFut: Future<Output = Result<(), Acquire::Error>> + Send + 'static,
{
    type Output = UseEffect::Output;
    type Error = Acquire::Error;
    type Env = Acquire::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let handle = self.acquire.run(env).await?;
        let use_effect = call::<Self::Error, _>(|| (self.use_fn)(&handle));
        let guard = ReleaseGuard::new(handle, Arc::clone(&self.release));

        let used = match use_effect {
            Ok(effect) => effect.run(env).await,
            Err(panicked) => Err(panicked),
        };
        let released = guard.release().await;

        match (used, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_error)) => Err(release_error),
            (Err(use_error), Ok(())) => Err(use_error),
            (Err(use_error), Err(release_error)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(?release_error, "resource release failed after use failure");
                #[cfg(not(feature = "tracing"))]
                eprintln!("resource release failed after use failure: {release_error:?}");
                Err(use_error)
            }
        }
    }
}

/// Holds an acquired handle until its release has finished.
///
/// Dropping a guard part way through spawns whatever remains: the whole
/// release step if the handle is still held, or the in-flight release
/// future if releasing had already begun.
struct ReleaseGuard<H, Rel, RelFut, E>
where
    H: Send + 'static,
    Rel: Fn(H) -> RelFut + Send + Sync + 'static,
    RelFut: Future<Output = Result<(), E>> + Send + 'static,
    E: Debug + Send + 'static,
{
    handle: Option<H>,
    in_flight: Option<Pin<Box<RelFut>>>,
    release: Arc<Rel>,
    _marker: PhantomData<fn() -> E>,
}

impl<H, Rel, RelFut, E> ReleaseGuard<H, Rel, RelFut, E>
where
    H: Send + 'static,
    Rel: Fn(H) -> RelFut + Send + Sync + 'static,
    RelFut: Future<Output = Result<(), E>> + Send + 'static,
    E: Fault + Debug + Send + 'static,
{
    fn new(handle: H, release: Arc<Rel>) -> Self {
        ReleaseGuard {
            handle: Some(handle),
            in_flight: None,
            release,
            _marker: PhantomData,
        }
    }

    async fn release(mut self) -> Result<(), E> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let release = Arc::clone(&self.release);
        let future = call::<E, _>(move || (*release)(handle))?;
        // owned by the guard while awaited, so a drop here still finishes it
        let in_flight = self.in_flight.insert(Box::pin(future));
        let released = shielded(in_flight).await;
        self.in_flight = None;
        released
    }
}

fn log_deferred_failure<E: Debug>(release_error: E) {
    #[cfg(feature = "tracing")]
    tracing::warn!(?release_error, "deferred resource release failed");
    #[cfg(not(feature = "tracing"))]
    eprintln!("deferred resource release failed: {release_error:?}");
}

impl<H, Rel, RelFut, E> Drop for ReleaseGuard<H, Rel, RelFut, E>
where
    H: Send + 'static,
    Rel: Fn(H) -> RelFut + Send + Sync + 'static,
    RelFut: Future<Output = Result<(), E>> + Send + 'static,
    E: Debug + Send + 'static,
{
    fn drop(&mut self) {
        let handle = self.handle.take();
        let in_flight = self.in_flight.take();
        if handle.is_none() && in_flight.is_none() {
            return;
        }
        let release = Arc::clone(&self.release);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    let outcome = match (in_flight, handle) {
                        (Some(in_flight), _) => in_flight.await,
                        (None, Some(handle)) => (*release)(handle).await,
                        (None, None) => Ok(()),
                    };
                    if let Err(release_error) = outcome {
                        log_deferred_failure(release_error);
                    }
                });
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::error!("resource dropped outside a tokio runtime; release skipped");
                #[cfg(not(feature = "tracing"))]
                eprintln!("resource dropped outside a tokio runtime; release skipped");
            }
        }
    }
}

/// Acquire a resource, use it, and release it with an explicit closure.
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use undertow::prelude::*;
///
/// # tokio_test::block_on(async {
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let (acq, rel) = (log.clone(), log.clone());
/// let effect = bracket(
///     from_fn(move |_: &()| {
///         acq.lock().unwrap().push("open");
///         Ok::<_, Error>(7)
///     }),
///     move |_fd: i32| {
///         let rel = rel.clone();
///         async move {
///             rel.lock().unwrap().push("close");
///             Ok::<(), Error>(())
///         }
///     },
///     |fd: &i32| pure::<_, Error, ()>(*fd * 6),
/// );
///
/// assert_eq!(effect.run(&()).await, Ok(42));
/// assert_eq!(*log.lock().unwrap(), vec!["open", "close"]);
/// # });
/// ```
pub fn bracket<Acquire, Rel, Use, UseEffect, RelFut>(
    acquire: Acquire,
    release: Rel,
    use_fn: Use,
) -> Bracket<Acquire, Rel, Use>
where
    Acquire: Effect,
    Acquire::Error: Fault + Debug + 'static,
    Acquire::Output: Send + 'static,
    Use: Fn(&Acquire::Output) -> UseEffect + Send + Sync,
    UseEffect: Effect<Error = Acquire::Error, Env = Acquire::Env>,
    Rel: Fn(Acquire::Output) -> RelFut + Send + Sync + 'static,
    RelFut: Future<Output = Result<(), Acquire::Error>> + Send + 'static,
{
    Bracket {
        acquire,
        release: Arc::new(release),
        use_fn,
    }
}

/// Acquire a [`Release`] handle, use it, and release it.
pub fn use_resource<Acquire, Use, UseEffect, H>(
    acquire: Acquire,
    use_fn: Use,
) -> Bracket<Acquire, ReleaseFn<H, H::Error>, Use>
where
    Acquire: Effect<Output = H>,
    Acquire::Error: Fault + Debug + 'static,
    H: Release<Error = Acquire::Error>,
    Use: Fn(&H) -> UseEffect + Send + Sync,
    UseEffect: Effect<Error = Acquire::Error, Env = Acquire::Env>,
{
    Bracket {
        acquire,
        release: Arc::new(release_handle::<H> as ReleaseFn<H, H::Error>),
        use_fn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::combinators::Pure;
    use crate::effect::prelude::*;
    use crate::env::Runtime;
    use crate::testing::Tracked;
    use std::time::Duration;

    #[tokio::test]
    async fn test_release_after_success() {
        let (handle, probe) = Tracked::new();
        let effect = use_resource(pure::<_, Error, ()>(handle), |_: &Tracked| pure(5));
        assert_eq!(effect.run(&()).await, Ok(5));
        assert_eq!(probe.releases(), 1);
    }

    #[tokio::test]
    async fn test_release_after_use_failure() {
        let (handle, probe) = Tracked::new();
        let effect = use_resource(pure::<_, Error, ()>(handle), |_: &Tracked| {
            fail::<i32, _, ()>(Error::new("use"))
        });
        assert_eq!(effect.run(&()).await, Err(Error::new("use")));
        assert_eq!(probe.releases(), 1);
    }

    #[tokio::test]
    async fn test_acquire_failure_skips_use_and_release() {
        let (_, probe) = Tracked::new();
        let used = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = used.clone();
        let effect = use_resource(fail::<Tracked, _, ()>(Error::new("acquire")), move |_: &Tracked| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            pure::<i32, Error, ()>(1)
        });
        assert_eq!(effect.run(&()).await, Err(Error::new("acquire")));
        assert!(!used.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(probe.releases(), 0);
    }

    #[tokio::test]
    async fn test_use_failure_wins_over_release_failure() {
        let (handle, probe) = Tracked::failing(Error::new("release"));
        let effect = use_resource(pure::<_, Error, ()>(handle), |_: &Tracked| {
            fail::<i32, _, ()>(Error::new("use"))
        });
        assert_eq!(effect.run(&()).await, Err(Error::new("use")));
        assert_eq!(probe.releases(), 1);
    }

    #[tokio::test]
    async fn test_release_failure_reported_after_success() {
        let (handle, _) = Tracked::failing(Error::new("release"));
        let effect = use_resource(pure::<_, Error, ()>(handle), |_: &Tracked| pure(1));
        assert_eq!(effect.run(&()).await, Err(Error::new("release")));
    }

    #[tokio::test]
    async fn test_panicking_use_still_releases() {
        let (handle, probe) = Tracked::new();
        let effect = use_resource(
            pure::<_, Error, ()>(handle),
            |_: &Tracked| -> Pure<i32, Error, ()> { panic!("use blew up") },
        );
        let err = effect.run(&()).await.unwrap_err();
        assert_eq!(err.code(), crate::error::codes::PANICKED);
        assert_eq!(probe.releases(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_use_still_releases() {
        let rt = Runtime::new();
        let (handle, probe) = Tracked::new();
        let effect = use_resource(pure::<_, Error, Runtime>(handle), |_: &Tracked| {
            from_async(|_: &Runtime| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<i32, Error>(1)
            })
        });

        let trigger = rt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        assert_eq!(effect.run(&rt).await, Err(Error::cancelled()));
        assert_eq!(probe.releases(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_run_releases_in_background() {
        let (handle, probe) = Tracked::new();
        let effect = use_resource(pure::<_, Error, ()>(handle), |_: &Tracked| {
            from_async(|_: &()| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<i32, Error>(1)
            })
        })
        .timeout(Duration::from_secs(1));

        assert!(effect.run(&()).await.unwrap_err().is_timed_out());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(probe.releases(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_release_finishes_after_outer_timeout() {
        let completed = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let done = completed.clone();
        let effect = bracket(
            pure::<_, Error, ()>(1u8),
            move |_: u8| {
                let done = done.clone();
                async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    done.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok::<(), Error>(())
                }
            },
            |_: &u8| pure(42),
        )
        .timeout(Duration::from_secs(1));

        assert!(effect.run(&()).await.unwrap_err().is_timed_out());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(completed.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_each_run_acquires_and_releases() {
        let (handle, probe) = Tracked::new();
        let effect = use_resource(pure::<_, Error, ()>(handle), |_: &Tracked| pure(()));
        for _ in 0..3 {
            assert_eq!(effect.run(&()).await, Ok(()));
        }
        assert_eq!(probe.releases(), 3);
    }

    #[tokio::test]
    async fn test_bracket_with_closure() {
        let released = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = released.clone();
        let effect = bracket(
            pure::<_, Error, ()>(String::from("socket")),
            move |name: String| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(name);
                    Ok::<(), Error>(())
                }
            },
            |name: &String| pure(name.len()),
        );
        assert_eq!(effect.run(&()).await, Ok(6));
        assert_eq!(*released.lock().unwrap(), vec!["socket".to_string()]);
    }
}
