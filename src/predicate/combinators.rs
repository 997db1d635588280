//! The [`Predicate`] trait and its boolean combinators.
//!
//! Recovery and retry never inspect an error themselves; they hand it to a
//! predicate. Composing matchers here keeps the decision of *which* failures
//! to retry or catch next to the policy that uses it.

/// Decides whether a value, usually a failure, is one a policy handles.
///
/// `retry_while` asks it whether a failed attempt deserves another run;
/// `catch` asks it whether to recover. It is evaluated once per failure.
/// Any `Fn(&T) -> bool` closure qualifies, so ad hoc checks need no wrapper.
///
/// ```rust
/// use undertow::predicate::*;
/// use undertow::Error;
///
/// // Coded, expected failures are worth retrying; uncoded ones are bugs.
/// let retryable = expected().and(has_code(0).not());
/// assert!(retryable.check(&Error::expected(7, "busy")));
/// assert!(!retryable.check(&Error::new("no code")));
///
/// let from_closure = |e: &Error| e.message().contains("reset");
/// assert!(from_closure.check(&Error::new("connection reset")));
/// ```
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// Returns `true` when `value` matches.
    fn check(&self, value: &T) -> bool;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    #[inline]
    fn check(&self, value: &T) -> bool {
        self(value)
    }
}

/// `and`, `or` and `not` on any [`Predicate`].
///
/// Each returns a small struct, so a composed matcher such as
/// `has_code(503).or(has_code(429)).and(cancelled().not())` stays a plain
/// value that can be cloned into every retry policy that needs it.
pub trait PredicateExt<T: ?Sized>: Predicate<T> + Sized {
    /// Matches failures accepted by both sides. `other` is not consulted if
    /// `self` already rejects.
    fn and<P: Predicate<T>>(self, other: P) -> And<Self, P> {
        And(self, other)
    }

    /// Matches failures accepted by either side.
    ///
    /// ```rust
    /// use undertow::predicate::*;
    /// use undertow::Error;
    ///
    /// let throttled = has_code(429).or(has_code(503));
    /// assert!(throttled.check(&Error::expected(503, "unavailable")));
    /// assert!(!throttled.check(&Error::expected(500, "internal")));
    /// ```
    fn or<P: Predicate<T>>(self, other: P) -> Or<Self, P> {
        Or(self, other)
    }

    /// Matches exactly the failures `self` rejects.
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: ?Sized, P: Predicate<T>> PredicateExt<T> for P {}

/// Matches every failure. The filter behind plain `retry` and `catch_all`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Always;

impl<T: ?Sized> Predicate<T> for Always {
    #[inline]
    fn check(&self, _: &T) -> bool {
        true
    }
}

/// Both matchers must accept. Built by [`PredicateExt::and`].
#[derive(Clone, Copy, Debug)]
pub struct And<L, R>(pub L, pub R);

impl<T: ?Sized, L: Predicate<T>, R: Predicate<T>> Predicate<T> for And<L, R> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value) && self.1.check(value)
    }
}

/// Either matcher may accept. Built by [`PredicateExt::or`].
#[derive(Clone, Copy, Debug)]
pub struct Or<L, R>(pub L, pub R);

impl<T: ?Sized, L: Predicate<T>, R: Predicate<T>> Predicate<T> for Or<L, R> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value) || self.1.check(value)
    }
}

/// Inverts a matcher. `retry_until` and `repeat_until` wrap their stop
/// condition in this.
#[derive(Clone, Copy, Debug)]
pub struct Not<P>(pub P);

impl<T: ?Sized, P: Predicate<T>> Predicate<T> for Not<P> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        !self.0.check(value)
    }
}
