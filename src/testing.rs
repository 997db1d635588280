//! Helpers for testing code built on effects.
//!
//! The assertion macros unwrap an effect's `Result` with a readable panic
//! message, and [`Tracked`] is a [`Release`] handle that records how often it
//! was released.
//!
//! ```rust
//! use undertow::prelude::*;
//! use undertow::testing::Tracked;
//! use undertow::{assert_fails_with, assert_succeeds};
//!
//! # tokio_test::block_on(async {
//! let (handle, probe) = Tracked::new();
//! let effect = use_resource(pure::<_, Error, ()>(handle), |_: &Tracked| pure(1));
//! assert_eq!(assert_succeeds!(effect.run(&()).await), 1);
//! assert_eq!(probe.releases(), 1);
//!
//! let denied = fail::<(), _, ()>(Error::expected(403, "denied"));
//! assert_fails_with!(denied.run(&()).await, 403);
//! # });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::effect::Release;
use crate::error::Error;

/// Assert that an effect result is a success, evaluating to the value.
///
/// Panics with the error if the result is a failure.
#[macro_export]
macro_rules! assert_succeeds {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected success, got failure: {:?}", e),
        }
    };
}

/// Assert that an effect result is a failure, evaluating to the error.
///
/// Panics with the value if the result is a success.
#[macro_export]
macro_rules! assert_fails {
    ($result:expr) => {
        match $result {
            Err(e) => e,
            Ok(value) => panic!("Expected failure, got success: {:?}", value),
        }
    };
}

/// Assert that an effect result is a failure carrying `code`.
///
/// The code may sit on the error itself, on an aggregate member, or on an
/// inner cause.
#[macro_export]
macro_rules! assert_fails_with {
    ($result:expr, $code:expr) => {
        match $result {
            Err(e) => {
                let e: $crate::Error = e;
                if !e.has_code($code) {
                    panic!("Expected failure with code {}, got: {:?}", $code, e);
                }
            }
            Ok(value) => panic!(
                "Expected failure with code {}, got success: {:?}",
                $code, value
            ),
        }
    };
}

/// A resource handle that counts its releases.
///
/// Clones share one [`Probe`], so an effect that hands out clones of the same
/// `Tracked` on every run is observed as a whole.
#[derive(Debug, Clone)]
pub struct Tracked {
    probe: Probe,
    failure: Option<Error>,
}

/// Read side of a [`Tracked`] handle.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    releases: Arc<AtomicUsize>,
}

impl Probe {
    /// How many times a handle sharing this probe was released.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl Tracked {
    /// A handle whose release succeeds.
    pub fn new() -> (Tracked, Probe) {
        let probe = Probe::default();
        let handle = Tracked {
            probe: probe.clone(),
            failure: None,
        };
        (handle, probe)
    }

    /// A handle whose release fails with `error`.
    pub fn failing(error: Error) -> (Tracked, Probe) {
        let (mut handle, probe) = Tracked::new();
        handle.failure = Some(error);
        (handle, probe)
    }
}

impl Release for Tracked {
    type Error = Error;

    async fn release(self) -> Result<(), Error> {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
