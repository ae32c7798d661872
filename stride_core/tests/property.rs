use proptest::prelude::*;
use stride_core::accumulator::{AccumulatorState, DAY_UNSET, advance};
use stride_traits::StepReading;

prop_compose! {
    /// Non-negative, non-decreasing cumulative totals within one day.
    fn monotonic_totals()(
        start in 0u32..1_000_000,
        deltas in prop::collection::vec(0u32..500, 1..60),
    ) -> Vec<f64> {
        let mut v = Vec::with_capacity(deltas.len() + 1);
        let mut total = u64::from(start);
        v.push(total as f64);
        for d in deltas {
            total += u64::from(d);
            v.push(total as f64);
        }
        v
    }
}

proptest! {
    #[test]
    fn monotonic_readings_count_last_minus_first(totals in monotonic_totals()) {
        let mut state = AccumulatorState::fresh(DAY_UNSET);
        for t in &totals {
            let (next, _) = advance(state, StepReading::counter(*t), 150);
            state = next;
        }
        let expected = (totals[totals.len() - 1] - totals[0]) as u32;
        prop_assert_eq!(state.steps_today, expected);
    }

    #[test]
    fn arbitrary_counter_sequences_never_underflow(
        values in prop::collection::vec(0u32..2_000_000, 1..80),
        days in prop::collection::vec(100u16..103, 1..80),
    ) {
        // Pair each reading with a (possibly changing) day; whatever the
        // interleaving of rollovers and discontinuities, the count is a
        // valid u32 and matches a query on the final day.
        let mut state = AccumulatorState::fresh(DAY_UNSET);
        for (v, d) in values.iter().zip(days.iter().cycle()) {
            let (next, emitted) = advance(state, StepReading::counter(f64::from(*v)), *d);
            prop_assert_eq!(emitted, next.steps_today);
            state = next;
        }
        prop_assert!(state.baseline.is_some());
        if let (Some(b), Some(l)) = (state.baseline, state.last_value) {
            prop_assert!(b <= l);
        }
    }

    #[test]
    fn detector_events_sum_to_n_in_any_batching(batches in prop::collection::vec(1u32..10, 0..40)) {
        let mut state = AccumulatorState::fresh(77);
        let mut n: u32 = 0;
        for b in &batches {
            n += *b;
            let (next, _) = advance(state, StepReading::detected(f64::from(*b)), 77);
            state = next;
        }
        prop_assert_eq!(state.steps_today, n);
    }
}
