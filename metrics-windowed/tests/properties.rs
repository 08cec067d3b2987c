use metrics_windowed::{BucketedHistogram, Registry, DEFAULT_QUANTILES};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_quantiles_are_monotonic(values in prop::collection::vec(1u64..=100_000, 1..500)) {
        let mut histogram = BucketedHistogram::new(1, 100_000, 3).expect("valid histogram");
        for value in &values {
            histogram.record(*value).expect("value in range");
        }

        let mut previous = 0;
        for q in [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 0.95, 0.99, 0.999, 1.0] {
            let current = histogram.value_at_quantile(q);
            prop_assert!(current >= previous, "quantile {} went down: {} < {}", q, current, previous);
            previous = current;
        }

        // Every estimate stays within the relative error of the recorded extremes.
        let max = *values.iter().max().expect("non-empty");
        prop_assert!(histogram.value_at_quantile(1.0) >= max);
        prop_assert!(histogram.value_at_quantile(1.0) <= max + max / 1000 + 1);
    }

    #[test]
    fn test_quantile_gauges_are_monotonic(values in prop::collection::vec(1u64..=10_000, 1..200)) {
        let registry = Registry::builder().without_rotator().build().expect("failed to build registry");
        let histogram = registry.histogram("h", 1, 10_000, 2).expect("failed to create histogram");
        for value in &values {
            histogram.record(*value).expect("value in range");
        }

        let gauges = registry.gauges();
        prop_assert_eq!(gauges.len(), DEFAULT_QUANTILES.len());

        let readings = ["h.P50", "h.P75", "h.P90", "h.P95", "h.P99", "h.P999"]
            .iter()
            .map(|name| gauges[*name])
            .collect::<Vec<_>>();
        prop_assert!(readings.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_counter_adds_are_additive(deltas in prop::collection::vec(0u64..1_000_000, 0..100)) {
        let registry = Registry::builder().without_rotator().build().expect("failed to build registry");
        let counter = registry.counter("total");
        for delta in &deltas {
            counter.add(*delta);
        }

        prop_assert_eq!(counter.value(), deltas.iter().sum::<u64>());
    }

    #[test]
    fn test_increment_matches_add_one(times in 0usize..500) {
        let registry = Registry::builder().without_rotator().build().expect("failed to build registry");
        for _ in 0..times {
            registry.counter("incremented").increment();
            registry.counter("added").add(1);
        }

        let counters = registry.counters();
        prop_assert_eq!(counters.get("incremented"), counters.get("added"));
    }
}
