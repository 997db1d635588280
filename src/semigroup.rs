//! Semigroup trait for associative combination.
//!
//! Parallel combinators such as [`apply`](crate::effect::apply) and
//! [`apply_all`](crate::effect::apply_all) use `Semigroup` to fold every
//! failure they observe into one error value instead of keeping only the
//! first one.
//!
//! # Laws
//!
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use undertow::{Error, Semigroup};
//!
//! let v = vec![1, 2].combine(vec![3]);
//! assert_eq!(v, vec![1, 2, 3]);
//!
//! let both = Error::new("disk full").combine(Error::new("quota exceeded"));
//! assert_eq!(both.errors().len(), 2);
//! ```

/// A type that supports an associative binary operation
///
/// `combine` takes both operands by value. Clone first if you need to keep
/// the originals.
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl Semigroup for String {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<A: Semigroup, B: Semigroup> Semigroup for (A, B) {
    fn combine(self, other: Self) -> Self {
        (self.0.combine(other.0), self.1.combine(other.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use proptest::prelude::*;

    #[test]
    fn test_messages_concatenate() {
        let log = String::from("connect;").combine(String::from("handshake;"));
        assert_eq!(log, "connect;handshake;");
    }

    #[test]
    fn test_pairs_combine_componentwise() {
        let left = (vec!["db"], Error::new("timeout"));
        let right = (vec!["cache"], Error::new("evicted"));
        let (sources, error) = left.combine(right);
        assert_eq!(sources, ["db", "cache"]);
        assert_eq!(error.errors().len(), 2);
    }

    #[test]
    fn test_error_aggregates_flatten() {
        let nested = Error::new("a").combine(Error::new("b"));
        let flat = nested.combine(Error::new("c"));
        let messages: Vec<_> = flat.errors().iter().map(|e| e.message()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_error_combine_is_associative(
            a in "[a-z]{1,6}",
            b in "[a-z]{1,6}",
            c in "[a-z]{1,6}",
        ) {
            let (x, y, z) = (Error::new(a), Error::new(b), Error::new(c));
            let left = x.clone().combine(y.clone()).combine(z.clone());
            let right = x.combine(y.combine(z));
            prop_assert_eq!(left, right);
        }
    }
}
