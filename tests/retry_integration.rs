//! Integration tests for schedule-driven retry, repeat and reduce.
//!
//! Time is paused in every timing-sensitive test so that the delays a
//! schedule asks for can be measured.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use undertow::prelude::*;
use undertow::{assert_fails_with, assert_succeeds};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn assert_elapsed(started: Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + ms(5),
        "expected about {expected:?}, got {elapsed:?}"
    );
}

/// A service that fails `failures` times with `code`, then answers.
fn flaky_service(
    failures: u32,
    code: i32,
) -> (Arc<AtomicU32>, impl Effect<Output = &'static str, Error = Error, Env = Runtime>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let effect = from_fn(move |_: &Runtime| {
        if counter.fetch_add(1, Ordering::SeqCst) < failures {
            Err(Error::expected(code, "service unavailable"))
        } else {
            Ok("ok")
        }
    });
    (calls, effect)
}

// ============================================================================
// Retry
// ============================================================================

#[tokio::test(start_paused = true)]
async fn exponential_backoff_waits_between_attempts() {
    let (calls, service) = flaky_service(3, 503);
    let effect = service.retry(Schedule::exponential(ms(100), 2.0).take(5));

    let started = Instant::now();
    assert_eq!(effect.run(&Runtime::new()).await, Ok("ok"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_elapsed(started, ms(100 + 200 + 400));
}

#[tokio::test(start_paused = true)]
async fn exhausted_schedule_returns_last_error() {
    let (calls, service) = flaky_service(u32::MAX, 503);
    let effect = service.retry(Schedule::spaced(ms(10)).take(3));

    assert_fails_with!(effect.run(&Runtime::new()).await, 503);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn capped_backoff_never_waits_longer_than_the_cap() {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let log = delays.clone();
    let (_, service) = flaky_service(u32::MAX, 500);
    let effect = service.retry_with_hooks(
        Schedule::exponential(ms(50), 3.0).max_delay(ms(500)).take(5),
        move |event: &RetryEvent<'_, Error>| {
            if let Some(delay) = event.next_delay {
                log.lock().unwrap().push(delay);
            }
        },
    );

    assert!(effect.run(&Runtime::new()).await.is_err());
    assert_eq!(
        *delays.lock().unwrap(),
        vec![ms(50), ms(150), ms(450), ms(500), ms(500)]
    );
}

#[tokio::test(start_paused = true)]
async fn retry_only_transient_errors() {
    let (calls, service) = flaky_service(u32::MAX, 404);
    let effect = service.retry_while(Schedule::forever(), |e: &Error| e.code() >= 500);

    assert_fails_with!(effect.run(&Runtime::new()).await, 404);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_runtime_stops_retrying() {
    let rt = Runtime::new();
    let (calls, service) = flaky_service(u32::MAX, 503);
    let effect = service.retry(Schedule::spaced(Duration::from_secs(10)));

    let trigger = rt.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        trigger.cancel();
    });

    assert_eq!(effect.run(&rt).await, Err(Error::cancelled()));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn union_of_schedules_keeps_going_while_either_does() {
    let (calls, service) = flaky_service(u32::MAX, 503);
    let schedule = Schedule::spaced(ms(100)).take(2) | Schedule::spaced(ms(10)).take(4);
    let effect = service.retry(schedule);

    let started = Instant::now();
    assert!(effect.run(&Runtime::new()).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_elapsed(started, ms(40));
}

#[tokio::test(start_paused = true)]
async fn timeout_inside_retry_is_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let slow_then_fast = from_async(move |_: &Runtime| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt == 0 {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok::<_, Error>(attempt)
        }
    });

    let effect = slow_then_fast
        .timeout(Duration::from_secs(1))
        .retry(Schedule::recurs(2));

    assert_eq!(assert_succeeds!(effect.run(&Runtime::new()).await), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Repeat and reduce
// ============================================================================

#[tokio::test(start_paused = true)]
async fn polling_repeats_until_ready() {
    let polls = Arc::new(AtomicU32::new(0));
    let counter = polls.clone();
    let poll = from_fn(move |_: &Runtime| Ok::<_, Error>(counter.fetch_add(1, Ordering::SeqCst)));

    let started = Instant::now();
    let effect = poll.repeat_until(Schedule::spaced(ms(250)), |n: &u32| *n >= 3);
    assert_eq!(effect.run(&Runtime::new()).await, Ok(3));
    assert_elapsed(started, ms(750));
}

#[tokio::test]
async fn reduce_sums_until_input_runs_out() {
    let next = Arc::new(AtomicU32::new(0));
    let reader = from_fn(move |_: &()| {
        let n = next.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= 3 {
            Ok(n)
        } else {
            Err(Error::new("end of input"))
        }
    });

    let total = reader.reduce(Schedule::forever(), 0, |acc, n| acc + n);
    assert_eq!(total.run(&()).await, Ok(6));
}
