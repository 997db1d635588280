//! Integration tests for scoped resources backed by real files.
//!
//! These tests verify that `use_resource` and `bracket` release what they
//! acquire on every path, including failures and cancellation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use undertow::prelude::*;
use undertow::testing::Tracked;
use undertow::{assert_fails, assert_succeeds};

// ============================================================================
// File handles
// ============================================================================

/// Helper to create a unique temp file path
fn temp_file_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("undertow_resource_test_{}.txt", name))
}

/// A scratch file removed on release.
struct ScratchFile {
    path: PathBuf,
    releases: Arc<AtomicUsize>,
}

impl Release for ScratchFile {
    type Error = Error;

    async fn release(self) -> Result<(), Error> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        tokio::fs::remove_file(&self.path).await?;
        Ok(())
    }
}

fn create_scratch(
    name: &'static str,
    releases: Arc<AtomicUsize>,
) -> impl Effect<Output = ScratchFile, Error = Error, Env = Runtime> {
    from_fn(move |_: &Runtime| -> Result<ScratchFile, Error> {
        let path = temp_file_path(name);
        std::fs::write(&path, "test content")?;
        Ok(ScratchFile {
            path,
            releases: releases.clone(),
        })
    })
}

#[tokio::test]
async fn scratch_file_is_removed_after_success() {
    let releases = Arc::new(AtomicUsize::new(0));
    let effect = use_resource(create_scratch("success", releases.clone()), |file: &ScratchFile| {
        let path = file.path.clone();
        from_fn(move |_: &Runtime| Ok::<_, Error>(std::fs::read_to_string(&path)?))
    });

    let content = assert_succeeds!(effect.run(&Runtime::new()).await);
    assert_eq!(content, "test content");
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert!(!temp_file_path("success").exists());
}

#[tokio::test]
async fn scratch_file_is_removed_after_failure() {
    let releases = Arc::new(AtomicUsize::new(0));
    let effect = use_resource(create_scratch("failure", releases.clone()), |_: &ScratchFile| {
        fail::<String, _, Runtime>(Error::expected(422, "unparseable"))
    });

    let err = assert_fails!(effect.run(&Runtime::new()).await);
    assert_eq!(err.code(), 422);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert!(!temp_file_path("failure").exists());
}

#[tokio::test]
async fn release_error_surfaces_when_use_succeeds() {
    let releases = Arc::new(AtomicUsize::new(0));
    let acquire = create_scratch("early_removal", releases.clone());
    let effect = use_resource(acquire, |file: &ScratchFile| {
        // remove the file early so that release fails
        let path = file.path.clone();
        from_fn(move |_: &Runtime| Ok::<_, Error>(std::fs::remove_file(&path)?))
    });

    let err = assert_fails!(effect.run(&Runtime::new()).await);
    assert!(err.native().is_some());
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn acquire_failure_skips_release() {
    let used = Arc::new(AtomicUsize::new(0));
    let counter = used.clone();
    let effect = use_resource(
        from_fn(|_: &Runtime| -> Result<ScratchFile, Error> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }),
        move |_: &ScratchFile| {
            counter.fetch_add(1, Ordering::SeqCst);
            pure::<(), Error, Runtime>(())
        },
    );

    assert!(assert_fails!(effect.run(&Runtime::new()).await).is_exceptional());
    assert_eq!(used.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Cancellation and composition
// ============================================================================

#[tokio::test(start_paused = true)]
async fn cancellation_inside_use_still_releases() {
    let rt = Runtime::new();
    let (handle, probe) = Tracked::new();
    let effect = use_resource(pure::<_, Error, Runtime>(handle), |_: &Tracked| {
        from_async(|_: &Runtime| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, Error>("finished")
        })
    });

    let trigger = rt.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });

    assert_eq!(effect.run(&rt).await, Err(Error::cancelled()));
    assert_eq!(probe.releases(), 1);
}

type ReleaseLog = Arc<std::sync::Mutex<Vec<&'static str>>>;

fn logging_release(
    log: ReleaseLog,
) -> impl Fn(&'static str) -> BoxFuture<'static, Result<(), Error>> + Send + Sync + 'static {
    move |name| {
        let log = log.clone();
        Box::pin(async move {
            log.lock().unwrap().push(name);
            Ok(())
        })
    }
}

#[tokio::test]
async fn nested_resources_release_inner_first() {
    let order: ReleaseLog = Arc::default();

    let inner = bracket(
        pure::<_, Error, ()>("inner"),
        logging_release(order.clone()),
        |_: &&'static str| pure(()),
    )
    .boxed();
    let outer = bracket(
        pure::<_, Error, ()>("outer"),
        logging_release(order.clone()),
        move |_: &&'static str| inner.clone(),
    );

    assert_eq!(outer.run(&()).await, Ok(()));
    assert_eq!(*order.lock().unwrap(), vec!["inner", "outer"]);
}

#[tokio::test]
async fn retried_use_reacquires_each_time() {
    let (handle, probe) = Tracked::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let effect = use_resource(pure::<_, Error, ()>(handle), move |_: &Tracked| {
        let counter = counter.clone();
        from_fn(move |_: &()| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::expected(503, "busy"))
            } else {
                Ok("done")
            }
        })
    })
    .retry(Schedule::recurs(5));

    assert_eq!(effect.run(&()).await, Ok("done"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(probe.releases(), 3);
}
