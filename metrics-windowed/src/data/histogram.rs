use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bucket::BucketedHistogram;
use crate::errors::RecordError;

/// A windowed histogram.
///
/// This histogram provides a view of values that rolls forward over time, dropping old values as
/// they exceed the window.  Values are recorded into a "current" slice.  Each rotation retires the
/// current slice into a ring of past slices, evicting the oldest one once the ring is full, so
/// memory usage is bounded no matter how long the process runs.
///
/// A window of `N` slices is the current slice plus the `N - 1` most recently retired ones: with a
/// rotation every `T`, a value stops influencing merged results after exactly `N` rotations, or
/// `N * T`.  Windows of zero or one slice only ever hold the current slice.
#[derive(Debug)]
pub(crate) struct WindowedHistogram {
    current: BucketedHistogram,
    window: VecDeque<BucketedHistogram>,
    capacity: usize,
}

impl WindowedHistogram {
    pub fn new(current: BucketedHistogram, slices: usize) -> Self {
        let capacity = slices.saturating_sub(1);
        WindowedHistogram { current, window: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn record(&mut self, value: u64) -> Result<(), RecordError> {
        self.current.record(value)
    }

    /// Retires the current slice into the window and starts a fresh one.
    pub fn rotate(&mut self) {
        let fresh = if self.window.len() >= self.capacity {
            match self.window.pop_front() {
                // Reuse the evicted slice's buckets for the new current slice.
                Some(mut oldest) => {
                    oldest.reset();
                    oldest
                }
                None => {
                    // Single slice: nothing is retained past the current one.
                    self.current.reset();
                    return;
                }
            }
        } else {
            self.current.empty_like()
        };

        let retired = mem::replace(&mut self.current, fresh);
        self.window.push_back(retired);
    }

    /// Combines the current slice and every retained slice into a single histogram.
    pub fn merge(&self) -> BucketedHistogram {
        let mut merged = self.current.clone();
        for slice in &self.window {
            merged.add(slice);
        }
        merged
    }

    #[cfg(test)]
    pub fn slices(&self) -> usize {
        self.window.len()
    }

    pub fn current(&self) -> &BucketedHistogram {
        &self.current
    }
}

struct State {
    window: WindowedHistogram,
    merged: Option<BucketedHistogram>,
}

struct Inner {
    name: String,
    state: RwLock<State>,
}

/// A reference to a registered histogram.
///
/// A [`Histogram`] is used for directly recording values, without any lookup overhead.  Clones
/// refer to the same underlying histogram.
///
/// Quantiles are read from the result of the most recent merge.  Merges happen when gauges are
/// snapshotted from the registry that owns this histogram.
#[derive(Clone)]
pub struct Histogram {
    inner: Arc<Inner>,
}

impl Histogram {
    pub(crate) fn new(name: String, buckets: BucketedHistogram, window_slices: usize) -> Self {
        let state = State { window: WindowedHistogram::new(buckets, window_slices), merged: None };
        Histogram { inner: Arc::new(Inner { name, state: RwLock::new(state) }) }
    }

    /// Records a value for the histogram.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::OutOfRange`] if the value is outside of the range the histogram was
    /// created with.  The value is dropped, and whether that is worth logging is up to the caller.
    pub fn record(&self, value: u64) -> Result<(), RecordError> {
        self.inner.state.write().window.record(value)
    }

    /// Gets the name this histogram was registered under.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Gets the inclusive range of accepted values, as `(min, max)`.
    pub fn bounds(&self) -> (u64, u64) {
        self.inner.state.read().window.current().bounds()
    }

    /// Gets the lowest value accepted by this histogram.
    pub fn min(&self) -> u64 {
        self.bounds().0
    }

    /// Gets the highest value accepted by this histogram.
    pub fn max(&self) -> u64 {
        self.bounds().1
    }

    /// Gets the number of significant figures this histogram was created with.
    pub fn significant_figures(&self) -> u8 {
        self.inner.state.read().window.current().significant_figures()
    }

    /// Gets the estimated value at the given quantile as of the most recent merge.
    ///
    /// Returns `0` if no merge has happened yet.
    pub fn value_at_quantile(&self, quantile: f64) -> u64 {
        self.inner
            .state
            .read()
            .merged
            .as_ref()
            .map_or(0, |merged| merged.value_at_quantile(quantile))
    }

    pub(crate) fn rotate(&self) {
        self.inner.state.write().window.rotate();
    }

    pub(crate) fn merge(&self) {
        let mut state = self.inner.state.write();
        let merged = state.window.merge();
        state.merged = Some(merged);
    }

    #[cfg(test)]
    pub(crate) fn slices(&self) -> usize {
        self.inner.state.read().window.slices()
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Histogram")
            .field("name", &self.inner.name)
            .field("window", &state.window)
            .field("merged", &state.merged.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Histogram, WindowedHistogram};
    use crate::bucket::BucketedHistogram;
    use crossbeam_utils::thread;

    fn buckets() -> BucketedHistogram {
        BucketedHistogram::new(1, 10_000, 3).expect("valid histogram")
    }

    #[test]
    fn test_windowed_histogram_rollover() {
        let mut h = WindowedHistogram::new(buckets(), 3);

        // Histogram is empty, merge is empty.
        assert!(h.merge().is_empty());

        h.record(1).unwrap();
        h.record(2).unwrap();
        assert_eq!(h.merge().len(), 2);

        // Two rotations fill the window, and the first values are still present.
        for _ in 0..2 {
            h.rotate();
            assert_eq!(h.merge().len(), 2);
        }
        assert_eq!(h.slices(), 2);

        // Pump in some new values.
        h.record(3).unwrap();
        h.record(4).unwrap();
        h.record(5).unwrap();
        assert_eq!(h.merge().len(), 5);

        // The third rotation since they were recorded drops the first values.
        h.rotate();
        assert_eq!(h.slices(), 2);
        let merged = h.merge();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.value_at_quantile(0.0), 3);

        // Two more rotations make three for the newer values as well.
        h.rotate();
        assert_eq!(h.merge().len(), 3);
        h.rotate();
        assert!(h.merge().is_empty());
        assert!(h.current().is_empty());
    }

    #[test]
    fn test_windowed_histogram_single_slice() {
        for slices in [0, 1] {
            let mut h = WindowedHistogram::new(buckets(), slices);
            h.record(42).unwrap();
            assert_eq!(h.merge().len(), 1);

            h.rotate();
            assert_eq!(h.slices(), 0);
            assert!(h.merge().is_empty());
        }
    }

    #[test]
    fn test_histogram_quantiles_require_merge() {
        let h = Histogram::new("latency".to_owned(), buckets(), 5);
        h.record(100).unwrap();
        h.record(200).unwrap();
        assert_eq!(h.value_at_quantile(0.5), 0);

        h.merge();
        assert_eq!(h.value_at_quantile(0.5), 100);
        assert_eq!(h.value_at_quantile(1.0), 200);

        // Recording after a merge is not visible until the next merge.
        h.record(300).unwrap();
        assert_eq!(h.value_at_quantile(1.0), 200);
        h.merge();
        assert_eq!(h.value_at_quantile(1.0), 300);
    }

    #[test]
    fn test_histogram_out_of_range_leaves_distribution_untouched() {
        let h = Histogram::new("latency".to_owned(), buckets(), 5);
        h.record(10).unwrap();
        assert!(h.record(0).is_err());
        assert!(h.record(10_001).is_err());

        h.merge();
        assert_eq!(h.value_at_quantile(0.0), 10);
        assert_eq!(h.value_at_quantile(1.0), 10);
        assert_eq!(h.bounds(), (1, 10_000));
        assert_eq!(h.min(), 1);
        assert_eq!(h.max(), 10_000);
        assert_eq!(h.significant_figures(), 3);
        assert_eq!(h.name(), "latency");
    }

    #[test]
    fn test_histogram_write_gauntlet_mt() {
        let h = Histogram::new("gauntlet".to_owned(), buckets(), 2);

        thread::scope(|s| {
            for _ in 0..3 {
                s.spawn(|_| {
                    for _ in 0..10_000 {
                        h.record(42).unwrap();
                    }
                });
            }
        })
        .unwrap();

        h.merge();
        assert_eq!(h.value_at_quantile(0.5), 42);

        // Every value landed in the current slice, so one rotation keeps them all and the second
        // one drops them.
        h.rotate();
        h.merge();
        assert_eq!(h.value_at_quantile(0.5), 42);
        assert_eq!(h.slices(), 1);

        h.rotate();
        h.merge();
        assert_eq!(h.value_at_quantile(0.5), 0);
    }
}
