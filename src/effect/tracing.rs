//! Span instrumentation for effects.
//!
//! Available with the `tracing` feature. Every run of an instrumented effect
//! enters the span for as long as the run's future is polled.

use crate::effect::trait_def::Effect;

/// An effect wrapped in a tracing span.
///
/// Created by [`EffectTracingExt::instrument`].
#[derive(Debug)]
pub struct Instrument<E> {
    pub(crate) inner: E,
    pub(crate) span: tracing::Span,
}

impl<E> Effect for Instrument<E>
where
    E: Effect,
{
    type Output = E::Output;
    type Error = E::Error;
    type Env = E::Env;

    async fn run(&self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        use tracing::Instrument as _;
        self.inner.run(env).instrument(self.span.clone()).await
    }
}

/// Extension trait for adding tracing instrumentation to effects.
pub trait EffectTracingExt: Effect {
    /// Wrap this effect in a tracing span.
    ///
    /// ```rust
    /// use undertow::prelude::*;
    /// use tracing::info_span;
    ///
    /// fn fetch_order(order_id: u64) -> impl Effect<Output = u64, Error = Error, Env = ()> {
    ///     pure(order_id).instrument(info_span!("fetch_order", order_id))
    /// }
    ///
    /// # tokio_test::block_on(async {
    /// assert_eq!(fetch_order(7).run(&()).await, Ok(7));
    /// # });
    /// ```
    fn instrument(self, span: tracing::Span) -> Instrument<Self> {
        Instrument { inner: self, span }
    }
}

impl<E: Effect> EffectTracingExt for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::prelude::*;
    use crate::env::Runtime;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_instrument_returns_value() {
        let effect = pure::<_, Error, ()>(42).instrument(tracing::info_span!("test_span"));
        assert_eq!(effect.run(&()).await, Ok(42));
    }

    #[tokio::test]
    async fn test_error_in_span_propagates() {
        let effect =
            fail::<i32, _, ()>(Error::new("oops")).instrument(tracing::info_span!("failing"));
        assert_eq!(effect.run(&()).await, Err(Error::new("oops")));
    }

    #[tokio::test]
    async fn test_nested_spans() {
        let inner = pure::<_, Error, ()>(1).instrument(tracing::debug_span!("inner_op"));
        let outer = inner.and_then(|x| pure(x + 1).instrument(tracing::debug_span!("outer_op")));
        assert_eq!(outer.run(&()).await, Ok(2));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_events_are_recorded_inside_the_span() {
        let effect = from_fn(|_: &()| {
            tracing::info!("inside the effect");
            Ok::<_, Error>(())
        })
        .instrument(tracing::info_span!("load_config"));
        assert_eq!(effect.run(&()).await, Ok(()));
        assert!(logs_contain("load_config"));
        assert!(logs_contain("inside the effect"));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_retry_logs_exhaustion() {
        let effect = fail::<(), _, Runtime>(Error::new("down"))
            .retry(Schedule::spaced(Duration::from_millis(5)).take(2));
        assert!(effect.run(&Runtime::new()).await.is_err());
        assert!(logs_contain("retrying"));
        assert!(logs_contain("retry schedule exhausted"));
    }
}
