//! Property-based tests for the algebraic laws effects obey.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use undertow::prelude::*;

fn arb_error() -> impl Strategy<Value = Error> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Error::new),
        (1i32..1000, "[a-z]{1,8}").prop_map(|(code, msg)| Error::expected(code, msg)),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Result<i32, Error>> {
    prop_oneof![any::<i32>().prop_map(Ok), arb_error().prop_map(Err)]
}

proptest! {
    #[test]
    fn prop_map_identity(outcome in arb_outcome()) {
        let effect = from_result::<_, _, ()>(outcome.clone()).map(|x| x);
        prop_assert_eq!(effect.run_blocking(&()), outcome);
    }

    #[test]
    fn prop_map_composition(outcome in arb_outcome()) {
        let f = |x: i32| x.wrapping_mul(3);
        let g = |x: i32| x.wrapping_sub(7);
        let chained = from_result::<_, _, ()>(outcome.clone()).map(f).map(g);
        let composed = from_result::<_, _, ()>(outcome).map(move |x| g(f(x)));
        prop_assert_eq!(chained.run_blocking(&()), composed.run_blocking(&()));
    }

    #[test]
    fn prop_and_then_left_identity(x in any::<i32>()) {
        let f = |n: i32| pure::<_, Error, ()>(n.wrapping_add(1));
        let bound = pure::<_, Error, ()>(x).and_then(f);
        prop_assert_eq!(bound.run_blocking(&()), f(x).run_blocking(&()));
    }

    #[test]
    fn prop_runs_are_referentially_transparent(outcome in arb_outcome()) {
        let effect = from_result::<_, _, ()>(outcome)
            .map(|x| x.wrapping_mul(2))
            .or_else(|e| fail::<i32, _, ()>(e.context("wrapped")));
        prop_assert_eq!(effect.run_blocking(&()), effect.run_blocking(&()));
    }

    #[test]
    fn prop_apply_aggregates_left_first(a in arb_error(), b in arb_error()) {
        let ff = fail::<fn(i32) -> i32, _, ()>(a.clone());
        let fa = fail::<i32, _, ()>(b.clone());
        let err = apply(ff, fa).run_blocking(&()).unwrap_err();
        prop_assert_eq!(err.errors(), &[a, b][..]);
    }

    #[test]
    fn prop_zip_reports_left_error_first(a in arb_error(), b in arb_error()) {
        let both = fail::<i32, _, ()>(a.clone()).zip(fail::<i32, _, ()>(b.clone()));
        prop_assert_eq!(both.run_blocking(&()), Err(a));

        let right_only = pure::<_, Error, ()>(1).zip(fail::<i32, _, ()>(b.clone()));
        prop_assert_eq!(right_only.run_blocking(&()), Err(b));
    }

    #[test]
    fn prop_retry_runs_n_plus_one_times(n in 0usize..20) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let effect = from_fn(move |_: &()| -> Result<(), Error> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::new("always"))
        })
        .retry(Schedule::recurs(n));

        prop_assert!(effect.run_blocking(&()).is_err());
        prop_assert_eq!(runs.load(Ordering::SeqCst), n + 1);
    }

    #[test]
    fn prop_catch_is_selective(code in 1i32..100, other in 100i32..200) {
        let effect = fail::<i32, _, ()>(Error::expected(other, "unhandled"))
            .catch_code(code, |_| pure(0));
        prop_assert_eq!(effect.run_blocking(&()).unwrap_err().code(), other);

        let handled = fail::<i32, _, ()>(Error::expected(code, "handled"))
            .catch_code(code, |_| pure(0));
        prop_assert_eq!(handled.run_blocking(&()), Ok(0));
    }

    #[test]
    fn prop_reduce_folds_every_value(values in prop::collection::vec(0u32..1000, 1..20)) {
        let expected: u32 = values.iter().sum();
        let next = Arc::new(AtomicUsize::new(0));
        let source = values.clone();
        let reader = from_fn(move |_: &()| {
            let i = next.fetch_add(1, Ordering::SeqCst);
            source.get(i).copied().ok_or_else(|| Error::new("drained"))
        });

        let total = reader.reduce(Schedule::forever(), 0u32, |acc, n| acc + n);
        prop_assert_eq!(total.run_blocking(&()), Ok(expected));
    }
}
