//! Schedules: composable, restartable sequences of delays.
//!
//! A [`Schedule`] describes *when* something should happen again. It is pure
//! data: constructing or combining schedules performs no work and never
//! touches a clock. The retry, repeat, and reduce engines pull delays from a
//! fresh [`Delays`] iterator on every run, so the same schedule always
//! replays the same sequence.
//!
//! A pull that yields `Some(delay)` means "continue after `delay`", and
//! `None` means "stop".
//!
//! # Building blocks
//!
//! | Constructor | Delays |
//! |-------------|--------|
//! | [`Schedule::forever`] | 0, 0, 0, ... |
//! | [`Schedule::spaced`] | d, d, d, ... |
//! | [`Schedule::linear`] | seed, seed·(1+f), seed·(1+2f), ... |
//! | [`Schedule::exponential`] | base, base·f, base·f², ... |
//! | [`Schedule::fibonacci`] | seed, seed, 2·seed, 3·seed, 5·seed, ... |
//! | [`Schedule::recurs`] | n zero delays |
//!
//! # Combining
//!
//! ```
//! use std::time::Duration;
//! use undertow::Schedule;
//!
//! let ms = Duration::from_millis;
//!
//! // Exponential backoff, capped at 500ms, at most 5 retries.
//! let policy = Schedule::exponential(ms(100), 2.0)
//!     .max_delay(ms(500))
//!     .take(5);
//!
//! let delays: Vec<_> = policy.iter().collect();
//! assert_eq!(delays, vec![ms(100), ms(200), ms(400), ms(500), ms(500)]);
//!
//! // Union keeps going while either side does, taking the shorter delay.
//! let union = Schedule::spaced(ms(50)).take(2) | Schedule::spaced(ms(10)).take(3);
//! assert_eq!(union.iter().collect::<Vec<_>>(), vec![ms(10), ms(10), ms(10)]);
//!
//! // Intersection stops as soon as either side does, taking the longer delay.
//! let both = Schedule::spaced(ms(50)).take(2) & Schedule::spaced(ms(10)).take(3);
//! assert_eq!(both.iter().collect::<Vec<_>>(), vec![ms(50), ms(50)]);
//! ```

mod iter;

use std::fmt;
use std::ops::{Add, BitAnd, BitOr};
use std::sync::Arc;
use std::time::Duration;

pub use iter::Delays;

type DelayMap = Arc<dyn Fn(Duration) -> Duration + Send + Sync>;
type DelayPredicate = Arc<dyn Fn(Duration) -> bool + Send + Sync>;

/// An immutable description of a sequence of delays.
///
/// Cloning is cheap: the node tree is shared.
#[derive(Clone)]
pub struct Schedule {
    node: Arc<Node>,
}

pub(crate) enum Node {
    Forever,
    Never,
    Spaced(Duration),
    Linear { seed: Duration, factor: f64 },
    Exponential { base: Duration, factor: f64 },
    Fibonacci { seed: Duration },
    Delays(Arc<[Duration]>),
    Take(Schedule, usize),
    Skip(Schedule, usize),
    Union(Schedule, Schedule),
    Intersect(Schedule, Schedule),
    Append(Schedule, Schedule),
    Map(Schedule, DelayMap),
    TakeWhile(Schedule, DelayPredicate),
    MaxDelay(Schedule, Duration),
    MaxCumulativeDelay(Schedule, Duration),
    NoDelayOnFirst(Schedule),
    RepeatForever(Schedule),
    #[cfg(feature = "jitter")]
    Jitter {
        inner: Schedule,
        factor: f64,
        seed: Option<u64>,
    },
    #[cfg(feature = "jitter")]
    Decorrelated { inner: Schedule, seed: Option<u64> },
}

impl Schedule {
    fn from_node(node: Node) -> Self {
        Schedule {
            node: Arc::new(node),
        }
    }

    /// Recur forever with no delay.
    ///
    /// This is the default driver: paired with [`take`](Self::take) it
    /// gives "retry n times immediately".
    pub fn forever() -> Self {
        Self::from_node(Node::Forever)
    }

    /// Never recur. An operation driven by this schedule runs exactly once.
    pub fn never() -> Self {
        Self::from_node(Node::Never)
    }

    /// Recur once with no delay.
    pub fn once() -> Self {
        Self::recurs(1)
    }

    /// Recur `n` times with no delay.
    pub fn recurs(n: usize) -> Self {
        Self::forever().take(n)
    }

    /// Recur forever with a fixed delay.
    pub fn spaced(delay: Duration) -> Self {
        Self::from_node(Node::Spaced(delay))
    }

    /// Recur forever with a linearly growing delay: `seed * (1 + factor * n)`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use undertow::Schedule;
    ///
    /// let s = Schedule::linear(Duration::from_millis(100), 1.0);
    /// let delays: Vec<_> = s.iter().take(3).collect();
    /// assert_eq!(delays, vec![
    ///     Duration::from_millis(100),
    ///     Duration::from_millis(200),
    ///     Duration::from_millis(300),
    /// ]);
    /// ```
    pub fn linear(seed: Duration, factor: f64) -> Self {
        Self::from_node(Node::Linear { seed, factor })
    }

    /// Recur forever, multiplying the previous delay by `factor` each time.
    ///
    /// ```
    /// use std::time::Duration;
    /// use undertow::Schedule;
    ///
    /// let s = Schedule::exponential(Duration::from_millis(100), 2.0);
    /// let delays: Vec<_> = s.iter().take(4).collect();
    /// assert_eq!(delays, vec![
    ///     Duration::from_millis(100),
    ///     Duration::from_millis(200),
    ///     Duration::from_millis(400),
    ///     Duration::from_millis(800),
    /// ]);
    /// ```
    pub fn exponential(base: Duration, factor: f64) -> Self {
        Self::from_node(Node::Exponential { base, factor })
    }

    /// Recur forever with delays following the Fibonacci sequence.
    pub fn fibonacci(seed: Duration) -> Self {
        Self::from_node(Node::Fibonacci { seed })
    }

    /// Recur once per listed delay.
    pub fn from_delays(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self::from_node(Node::Delays(delays.into_iter().collect()))
    }

    /// Stop after at most `n` steps.
    pub fn take(self, n: usize) -> Self {
        Self::from_node(Node::Take(self, n))
    }

    /// Drop the first `n` steps.
    pub fn skip(self, n: usize) -> Self {
        Self::from_node(Node::Skip(self, n))
    }

    /// Continue while either schedule continues, taking the shorter delay
    /// when both are active.
    pub fn union(self, other: Schedule) -> Self {
        Self::from_node(Node::Union(self, other))
    }

    /// Continue only while both schedules continue, taking the longer delay.
    pub fn intersect(self, other: Schedule) -> Self {
        Self::from_node(Node::Intersect(self, other))
    }

    /// Run this schedule to exhaustion, then `other`.
    pub fn append(self, other: Schedule) -> Self {
        Self::from_node(Node::Append(self, other))
    }

    /// Transform every delay.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Duration) -> Duration + Send + Sync + 'static,
    {
        Self::from_node(Node::Map(self, Arc::new(f)))
    }

    /// Stop at the first delay rejected by `predicate`.
    pub fn take_while<P>(self, predicate: P) -> Self
    where
        P: Fn(Duration) -> bool + Send + Sync + 'static,
    {
        Self::from_node(Node::TakeWhile(self, Arc::new(predicate)))
    }

    /// Clamp every delay to at most `cap`.
    pub fn max_delay(self, cap: Duration) -> Self {
        Self::from_node(Node::MaxDelay(self, cap))
    }

    /// Stop once the sum of delays would exceed `total`.
    pub fn max_cumulative_delay(self, total: Duration) -> Self {
        Self::from_node(Node::MaxCumulativeDelay(self, total))
    }

    /// Replace the first delay with zero.
    pub fn no_delay_on_first(self) -> Self {
        Self::from_node(Node::NoDelayOnFirst(self))
    }

    /// Restart this schedule every time it is exhausted.
    ///
    /// A schedule that yields nothing stays empty.
    pub fn repeat_forever(self) -> Self {
        Self::from_node(Node::RepeatForever(self))
    }

    /// Randomise every delay by up to `±factor` of its value.
    ///
    /// `factor` is clamped to `0.0..=1.0`. Each pull draws from a fresh
    /// generator, so replays differ; use [`jitter_seeded`](Self::jitter_seeded)
    /// when the sequence must be reproducible.
    #[cfg(feature = "jitter")]
    pub fn jitter(self, factor: f64) -> Self {
        Self::from_node(Node::Jitter {
            inner: self,
            factor: factor.clamp(0.0, 1.0),
            seed: None,
        })
    }

    /// Like [`jitter`](Self::jitter), with a fixed seed.
    #[cfg(feature = "jitter")]
    pub fn jitter_seeded(self, factor: f64, seed: u64) -> Self {
        Self::from_node(Node::Jitter {
            inner: self,
            factor: factor.clamp(0.0, 1.0),
            seed: Some(seed),
        })
    }

    /// Decorrelated jitter: each delay is drawn between the scheduled delay
    /// and three times the previously emitted one.
    #[cfg(feature = "jitter")]
    pub fn decorrelated(self) -> Self {
        Self::from_node(Node::Decorrelated {
            inner: self,
            seed: None,
        })
    }

    /// Like [`decorrelated`](Self::decorrelated), with a fixed seed.
    #[cfg(feature = "jitter")]
    pub fn decorrelated_seeded(self, seed: u64) -> Self {
        Self::from_node(Node::Decorrelated {
            inner: self,
            seed: Some(seed),
        })
    }

    /// Start a fresh pull from the beginning of the schedule.
    pub fn iter(&self) -> Delays {
        Delays::new(self)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::forever()
    }
}

impl IntoIterator for &Schedule {
    type Item = Duration;
    type IntoIter = Delays;

    fn into_iter(self) -> Delays {
        self.iter()
    }
}

impl BitOr for Schedule {
    type Output = Schedule;

    fn bitor(self, rhs: Schedule) -> Schedule {
        self.union(rhs)
    }
}

impl BitAnd for Schedule {
    type Output = Schedule;

    fn bitand(self, rhs: Schedule) -> Schedule {
        self.intersect(rhs)
    }
}

impl Add for Schedule {
    type Output = Schedule;

    fn add(self, rhs: Schedule) -> Schedule {
        self.append(rhs)
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.as_ref() {
            Node::Forever => write!(f, "Forever"),
            Node::Never => write!(f, "Never"),
            Node::Spaced(d) => f.debug_tuple("Spaced").field(d).finish(),
            Node::Linear { seed, factor } => f
                .debug_struct("Linear")
                .field("seed", seed)
                .field("factor", factor)
                .finish(),
            Node::Exponential { base, factor } => f
                .debug_struct("Exponential")
                .field("base", base)
                .field("factor", factor)
                .finish(),
            Node::Fibonacci { seed } => f.debug_struct("Fibonacci").field("seed", seed).finish(),
            Node::Delays(delays) => f.debug_tuple("Delays").field(delays).finish(),
            Node::Take(inner, n) => f.debug_tuple("Take").field(inner).field(n).finish(),
            Node::Skip(inner, n) => f.debug_tuple("Skip").field(inner).field(n).finish(),
            Node::Union(a, b) => f.debug_tuple("Union").field(a).field(b).finish(),
            Node::Intersect(a, b) => f.debug_tuple("Intersect").field(a).field(b).finish(),
            Node::Append(a, b) => f.debug_tuple("Append").field(a).field(b).finish(),
            Node::Map(inner, _) => f
                .debug_tuple("Map")
                .field(inner)
                .field(&"<function>")
                .finish(),
            Node::TakeWhile(inner, _) => f
                .debug_tuple("TakeWhile")
                .field(inner)
                .field(&"<predicate>")
                .finish(),
            Node::MaxDelay(inner, cap) => {
                f.debug_tuple("MaxDelay").field(inner).field(cap).finish()
            }
            Node::MaxCumulativeDelay(inner, total) => f
                .debug_tuple("MaxCumulativeDelay")
                .field(inner)
                .field(total)
                .finish(),
            Node::NoDelayOnFirst(inner) => f.debug_tuple("NoDelayOnFirst").field(inner).finish(),
            Node::RepeatForever(inner) => f.debug_tuple("RepeatForever").field(inner).finish(),
            #[cfg(feature = "jitter")]
            Node::Jitter {
                inner,
                factor,
                seed,
            } => f
                .debug_struct("Jitter")
                .field("inner", inner)
                .field("factor", factor)
                .field("seed", seed)
                .finish(),
            #[cfg(feature = "jitter")]
            Node::Decorrelated { inner, seed } => f
                .debug_struct("Decorrelated")
                .field("inner", inner)
                .field("seed", seed)
                .finish(),
        }
    }
}

/// Multiply a duration by a non-negative factor, saturating at
/// `Duration::MAX` and rounding to the nearest nanosecond.
pub(crate) fn scale(base: Duration, multiplier: f64) -> Duration {
    if multiplier.is_nan() || multiplier <= 0.0 {
        return Duration::ZERO;
    }
    let nanos = (base.as_nanos() as f64 * multiplier).round();
    if nanos >= u64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::from_nanos(nanos as u64)
    }
}
