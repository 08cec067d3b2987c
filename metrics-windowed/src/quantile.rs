use std::sync::Arc;

use crate::data::Histogram;
use crate::registry::GaugeTable;

/// Quantiles exposed as gauges for every histogram, unless configured otherwise.
pub const DEFAULT_QUANTILES: &[f64] = &[0.5, 0.75, 0.9, 0.95, 0.99, 0.999];

/// A quantile, along with the label used to name its gauge.
///
/// Labels use the abbreviated percentile form, without a decimal point: `0.5` is `P50`, `0.99` is
/// `P99`, and `0.999` is `P999`.  The two ends of the range are labeled `min` and `max` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantile(f64, String);

impl Quantile {
    /// Creates a new [`Quantile`] from a floating-point value.
    ///
    /// Values are clamped between 0.0 and 1.0, and NaN is treated as 0.0.
    pub fn new(quantile: f64) -> Quantile {
        let value = if quantile.is_nan() { 0.0 } else { quantile.clamp(0.0, 1.0) };

        let label = if value == 0.0 {
            "min".to_owned()
        } else if value == 1.0 {
            "max".to_owned()
        } else {
            // Rounded to a millionth of a percent, so that 0.07 is `P7` rather than carrying
            // floating-point noise into the name.
            let percentile = (value * 1e8).round() / 1e6;
            format!("P{}", percentile).replace('.', "")
        };

        Quantile(value, label)
    }

    /// Gets the label used in gauge names.
    pub fn label(&self) -> &str {
        &self.1
    }

    /// Gets the raw quantile value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Parses a slice of floating-point values into a vector of [`Quantile`]s.
pub fn parse_quantiles(quantiles: &[f64]) -> Vec<Quantile> {
    quantiles.iter().map(|f| Quantile::new(*f)).collect()
}

/// Registers one gauge per quantile for `histogram`, named `<histogram>.<label>`.
///
/// Every gauge belongs to a batch keyed by the histogram name, whose initializer merges the
/// histogram's window, so a snapshot merges each histogram once and then reads all of its
/// quantiles from that merge.
pub(crate) fn register_quantile_gauges(
    gauges: &mut GaugeTable,
    histogram: &Histogram,
    quantiles: &[Quantile],
) {
    for quantile in quantiles {
        let name = format!("{}.{}", histogram.name(), quantile.label());
        let merging = histogram.clone();
        let reading = histogram.clone();
        let q = quantile.value();

        gauges.set_batch(
            &name,
            histogram.name().into(),
            Arc::new(move || merging.merge()),
            Arc::new(move || reading.value_at_quantile(q) as f64),
        );
    }
}
