//! Execution environments and cooperative cancellation.
//!
//! Every effect runs against an environment. Besides whatever dependencies
//! the caller puts in it, an environment may carry a cancellation signal,
//! exposed through [`HasCancel`]. The engine checks it before invoking user
//! closures, while awaiting user futures, and while waiting between retries.
//!
//! `()` is an environment with no cancellation signal, which keeps simple
//! effects and tests free of ceremony. [`Runtime`] is the stock environment
//! backed by a [`CancellationToken`].
//!
//! ```
//! use undertow::env::{HasCancel, Runtime};
//!
//! let rt = Runtime::new();
//! let child = rt.child();
//! rt.cancel();
//! assert!(child.is_cancelled());
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// An environment that may carry a cancellation signal.
///
/// Implement this for your own environment type by returning the token it
/// holds, or `None` if it cannot be cancelled.
///
/// ```
/// use undertow::env::HasCancel;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Clone)]
/// struct AppEnv {
///     shutdown: CancellationToken,
/// }
///
/// impl HasCancel for AppEnv {
///     fn cancel_token(&self) -> Option<&CancellationToken> {
///         Some(&self.shutdown)
///     }
/// }
/// ```
pub trait HasCancel {
    /// The cancellation token, if this environment has one.
    fn cancel_token(&self) -> Option<&CancellationToken>;

    /// Whether cancellation has been requested.
    fn is_cancelled(&self) -> bool {
        self.cancel_token().is_some_and(CancellationToken::is_cancelled)
    }
}

impl HasCancel for () {
    fn cancel_token(&self) -> Option<&CancellationToken> {
        None
    }
}

impl HasCancel for CancellationToken {
    fn cancel_token(&self) -> Option<&CancellationToken> {
        Some(self)
    }
}

impl<T: HasCancel + ?Sized> HasCancel for Arc<T> {
    fn cancel_token(&self) -> Option<&CancellationToken> {
        (**self).cancel_token()
    }
}

/// Resolve once cancellation is requested on `env`.
///
/// Never resolves for environments without a token.
pub async fn cancelled<Env: HasCancel + ?Sized>(env: &Env) {
    match env.cancel_token() {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

/// The stock environment: a cancellation scope.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    token: CancellationToken,
}

impl Runtime {
    /// Create a runtime with a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime driven by an existing token.
    pub fn with_token(token: CancellationToken) -> Self {
        Runtime { token }
    }

    /// The underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Request cancellation of every effect running against this runtime
    /// or one of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Derive a runtime that is cancelled with this one but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Runtime {
        Runtime {
            token: self.token.child_token(),
        }
    }
}

impl HasCancel for Runtime {
    fn cancel_token(&self) -> Option<&CancellationToken> {
        Some(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unit_env_is_never_cancelled() {
        assert!(().cancel_token().is_none());
        assert!(!().is_cancelled());
    }

    #[test]
    fn test_child_cancellation_does_not_reach_parent() {
        let rt = Runtime::new();
        let child = rt.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!rt.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let rt = Runtime::new();
        let trigger = rt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            trigger.cancel();
        });
        cancelled(&rt).await;
        assert!(rt.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_pends_without_token() {
        let outcome = tokio::time::timeout(Duration::from_millis(10), cancelled(&())).await;
        assert!(outcome.is_err());
    }
}
