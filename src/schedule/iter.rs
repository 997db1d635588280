//! The pull side of a schedule.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "jitter")]
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{scale, Node, Schedule};

/// A single pass over a [`Schedule`].
///
/// Obtained from [`Schedule::iter`]. Every call to `iter` starts over from the
/// first delay, independently of any other pass.
pub struct Delays {
    inner: Box<dyn Iterator<Item = Duration> + Send>,
}

impl Delays {
    pub(super) fn new(schedule: &Schedule) -> Self {
        Delays {
            inner: build(schedule),
        }
    }
}

impl Iterator for Delays {
    type Item = Duration;

    #[inline]
    fn next(&mut self) -> Option<Duration> {
        self.inner.next()
    }
}

impl fmt::Debug for Delays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delays").finish_non_exhaustive()
    }
}

type BoxIter = Box<dyn Iterator<Item = Duration> + Send>;

fn build(schedule: &Schedule) -> BoxIter {
    match schedule.node.as_ref() {
        Node::Forever => Box::new(std::iter::repeat(Duration::ZERO)),
        Node::Never => Box::new(std::iter::empty()),
        Node::Spaced(d) => Box::new(std::iter::repeat(*d)),
        Node::Linear { seed, factor } => {
            let (seed, factor) = (*seed, *factor);
            Box::new((0u64..).map(move |n| scale(seed, 1.0 + factor * n as f64)))
        }
        Node::Exponential { base, factor } => {
            let factor = *factor;
            Box::new(std::iter::successors(Some(*base), move |prev| {
                Some(scale(*prev, factor))
            }))
        }
        Node::Fibonacci { seed } => Box::new(
            std::iter::successors(Some((*seed, *seed)), |(a, b)| Some((*b, a.saturating_add(*b))))
                .map(|(a, _)| a),
        ),
        Node::Delays(list) => {
            let list = list.clone();
            Box::new((0..list.len()).map(move |i| list[i]))
        }
        Node::Take(inner, n) => Box::new(build(inner).take(*n)),
        Node::Skip(inner, n) => Box::new(build(inner).skip(*n)),
        Node::Union(a, b) => Box::new(Union {
            left: Some(build(a)),
            right: Some(build(b)),
        }),
        Node::Intersect(a, b) => Box::new(build(a).zip(build(b)).map(|(x, y)| x.max(y))),
        Node::Append(a, b) => Box::new(build(a).chain(build(b))),
        Node::Map(inner, f) => {
            let f = f.clone();
            Box::new(build(inner).map(move |d| f(d)))
        }
        Node::TakeWhile(inner, p) => {
            let p = p.clone();
            Box::new(build(inner).take_while(move |d| p(*d)))
        }
        Node::MaxDelay(inner, cap) => {
            let cap = *cap;
            Box::new(build(inner).map(move |d| d.min(cap)))
        }
        Node::MaxCumulativeDelay(inner, total) => {
            let total = *total;
            Box::new(build(inner).scan(Duration::ZERO, move |sum, d| {
                *sum = sum.saturating_add(d);
                (*sum <= total).then_some(d)
            }))
        }
        Node::NoDelayOnFirst(inner) => Box::new(
            build(inner)
                .enumerate()
                .map(|(i, d)| if i == 0 { Duration::ZERO } else { d }),
        ),
        Node::RepeatForever(inner) => Box::new(Cycle {
            current: build(inner),
            schedule: inner.clone(),
        }),
        #[cfg(feature = "jitter")]
        Node::Jitter {
            inner,
            factor,
            seed,
        } => {
            let factor = *factor;
            let mut rng = seeded_rng(*seed);
            Box::new(build(inner).map(move |d| {
                let offset = rng.random_range(-factor..=factor);
                scale(d, 1.0 + offset)
            }))
        }
        #[cfg(feature = "jitter")]
        Node::Decorrelated { inner, seed } => {
            let mut rng = seeded_rng(*seed);
            let mut previous = Duration::ZERO;
            Box::new(build(inner).map(move |d| {
                let upper = d.max(previous.saturating_mul(3));
                let next = if upper > d {
                    let nanos = rng.random_range(d.as_nanos()..=upper.as_nanos());
                    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
                } else {
                    d
                };
                previous = next;
                next
            }))
        }
    }
}

#[cfg(feature = "jitter")]
fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Yields while either side yields; the shorter delay wins.
struct Union {
    left: Option<BoxIter>,
    right: Option<BoxIter>,
}

impl Iterator for Union {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let l = pull(&mut self.left);
        let r = pull(&mut self.right);
        match (l, r) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn pull(side: &mut Option<BoxIter>) -> Option<Duration> {
    let next = side.as_mut()?.next();
    if next.is_none() {
        *side = None;
    }
    next
}

/// Restarts the inner schedule whenever it runs dry.
struct Cycle {
    current: BoxIter,
    schedule: Schedule,
}

impl Iterator for Cycle {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if let Some(d) = self.current.next() {
            return Some(d);
        }
        self.current = build(&self.schedule);
        // an empty schedule stays empty
        self.current.next()
    }
}
