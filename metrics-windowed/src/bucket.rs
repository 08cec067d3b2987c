use std::fmt;

use hdrhistogram::{CreationError, Histogram as HdrHistogram};
use tracing::warn;

use crate::errors::{HistogramError, RecordError};

/// A fixed-range, fixed-precision histogram.
///
/// `BucketedHistogram` tracks a distribution of integer values by counting them into buckets whose
/// width grows with the magnitude of the values, based on [HDRHistogram][hdr].  The number of
/// significant figures it is created with controls the relative error of any value read back out:
/// with 3 significant figures, a quantile is accurate to within 0.1% of the true value, and every
/// integer below 2048 is tracked exactly.
///
/// Only values within the inclusive `[min, max]` range given at creation are accepted.  The
/// histogram does no locking of its own.
///
/// [hdr]: https://docs.rs/hdrhistogram
#[derive(Clone)]
pub struct BucketedHistogram {
    inner: HdrHistogram<u64>,
    min: u64,
    max: u64,
}

impl BucketedHistogram {
    /// Creates a new [`BucketedHistogram`] accepting values in `[min, max]`.
    ///
    /// `sigfigs` must be between 0 and 5.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::InvalidBounds`] if `min` is greater than `max`, or if the range
    /// cannot be represented, and [`HistogramError::InvalidPrecision`] if `sigfigs` is too large.
    pub fn new(min: u64, max: u64, sigfigs: u8) -> Result<BucketedHistogram, HistogramError> {
        if min > max {
            return Err(HistogramError::InvalidBounds { min, max });
        }

        // The lowest discernible value must be non-zero and the highest trackable value must be at
        // least twice as large.  Zero itself is still recordable, and the range check below keeps
        // the accepted values within what the caller asked for.
        let low = min.max(1);
        let high = max.max(low.saturating_mul(2));
        let inner =
            HdrHistogram::new_with_bounds(low, high, sigfigs).map_err(|e| match e {
                CreationError::SigFigExceedsMax => HistogramError::InvalidPrecision { sigfigs },
                _ => HistogramError::InvalidBounds { min, max },
            })?;

        Ok(BucketedHistogram { inner, min, max })
    }

    /// Creates an empty histogram with the same range and precision as this one.
    pub fn empty_like(&self) -> BucketedHistogram {
        BucketedHistogram { inner: HdrHistogram::new_from(&self.inner), min: self.min, max: self.max }
    }

    /// Records a single value.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::OutOfRange`] if `value` is outside of `[min, max]`, in which case the
    /// value is dropped.
    pub fn record(&mut self, value: u64) -> Result<(), RecordError> {
        let (min, max) = (self.min, self.max);
        if value < min || value > max {
            return Err(RecordError::OutOfRange { value, min, max });
        }

        self.inner.record(value).map_err(|_| RecordError::OutOfRange { value, min, max })
    }

    /// Adds every value recorded in `other` to this histogram.
    ///
    /// Both histograms are expected to share the same range and precision.
    pub fn add(&mut self, other: &BucketedHistogram) {
        if let Err(e) = self.inner.add(&other.inner) {
            warn!(error = ?e, min = self.min, max = self.max, "Dropped histogram values during merge.");
        }
    }

    /// Clears all recorded values, keeping the allocated buckets.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Gets the estimated value at the given quantile.
    ///
    /// The quantile is clamped to `[0.0, 1.0]`.  The result is the highest value equivalent to the
    /// smallest bucket whose cumulative count reaches `quantile` of the total count, or `0` if no
    /// values have been recorded.
    pub fn value_at_quantile(&self, quantile: f64) -> u64 {
        if self.inner.is_empty() {
            return 0;
        }

        self.inner.value_at_quantile(quantile.clamp(0.0, 1.0))
    }

    /// Gets the number of recorded values.
    pub fn len(&self) -> u64 {
        self.inner.len()
    }

    /// Whether or not any values have been recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Gets the inclusive range of accepted values, as `(min, max)`.
    pub fn bounds(&self) -> (u64, u64) {
        (self.min, self.max)
    }

    /// Gets the number of significant figures this histogram was created with.
    pub fn significant_figures(&self) -> u8 {
        self.inner.sigfig()
    }
}

impl fmt::Debug for BucketedHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketedHistogram")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("sigfigs", &self.inner.sigfig())
            .field("len", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::BucketedHistogram;
    use crate::errors::{HistogramError, RecordError};

    fn triangular() -> BucketedHistogram {
        let mut histogram = BucketedHistogram::new(1, 1000, 3).expect("valid histogram");
        for i in (1..=100u64).rev() {
            for _ in 0..i {
                histogram.record(i).expect("value in range");
            }
        }
        histogram
    }

    #[test]
    fn test_triangular_quantiles() {
        let histogram = triangular();
        assert_eq!(histogram.len(), 5050);
        assert_eq!(histogram.value_at_quantile(0.5), 71);
        assert_eq!(histogram.value_at_quantile(0.75), 87);
        assert_eq!(histogram.value_at_quantile(0.9), 95);
        assert_eq!(histogram.value_at_quantile(0.95), 98);
        assert_eq!(histogram.value_at_quantile(0.99), 100);
        assert_eq!(histogram.value_at_quantile(0.999), 100);
    }

    #[test]
    fn test_out_of_range() {
        let mut histogram = BucketedHistogram::new(10, 100, 2).expect("valid histogram");
        assert_eq!(
            histogram.record(9),
            Err(RecordError::OutOfRange { value: 9, min: 10, max: 100 })
        );
        assert_eq!(
            histogram.record(101),
            Err(RecordError::OutOfRange { value: 101, min: 10, max: 100 })
        );
        assert!(histogram.is_empty());

        histogram.record(10).expect("lower bound is inclusive");
        histogram.record(100).expect("upper bound is inclusive");
        assert_eq!(histogram.len(), 2);
    }

    #[test]
    fn test_narrow_and_zero_ranges() {
        // Ranges narrower than what the underlying buckets need are still honored exactly.
        let mut narrow = BucketedHistogram::new(5, 8, 3).expect("valid histogram");
        narrow.record(5).expect("value in range");
        narrow.record(8).expect("value in range");
        assert!(narrow.record(4).is_err());
        assert!(narrow.record(9).is_err());
        assert_eq!(narrow.len(), 2);

        let mut zero = BucketedHistogram::new(0, 10, 3).expect("valid histogram");
        zero.record(0).expect("zero is in range");
        assert_eq!(zero.value_at_quantile(0.5), 0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            BucketedHistogram::new(10, 1, 3).unwrap_err(),
            HistogramError::InvalidBounds { min: 10, max: 1 }
        );
        assert_eq!(
            BucketedHistogram::new(1, 1000, 6).unwrap_err(),
            HistogramError::InvalidPrecision { sigfigs: 6 }
        );
    }

    #[test]
    fn test_add_and_reset() {
        let mut a = BucketedHistogram::new(1, 1000, 3).expect("valid histogram");
        let mut b = a.empty_like();
        a.record(10).expect("value in range");
        b.record(20).expect("value in range");
        b.record(30).expect("value in range");

        a.add(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.value_at_quantile(1.0), 30);
        assert_eq!(b.len(), 2);

        a.reset();
        assert!(a.is_empty());
        assert_eq!(a.value_at_quantile(0.5), 0);
        assert_eq!(a.bounds(), (1, 1000));
        assert_eq!(a.significant_figures(), 3);
    }
}
