use std::collections::BTreeMap;

/// A point-in-time copy of the counters and gauges of a registry.
///
/// Both documents are flat maps keyed by metric name, sorted by name.  They can be rendered as
/// flat JSON objects for reporting:
///
/// ```text
/// {"requests":1204,"requests.failed":3}
/// {"latency.P50":12.0,"latency.P99":89.0,"queue.depth":4.0}
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, f64>,
}

impl Snapshot {
    pub(crate) fn new(counters: BTreeMap<String, u64>, gauges: BTreeMap<String, f64>) -> Self {
        Self { counters, gauges }
    }

    /// Gets the counter values.
    pub fn counters(&self) -> &BTreeMap<String, u64> {
        &self.counters
    }

    /// Gets the gauge values.
    pub fn gauges(&self) -> &BTreeMap<String, f64> {
        &self.gauges
    }

    /// Whether or not the snapshot holds no metrics at all.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.gauges.is_empty()
    }

    /// Renders the counters as a flat JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn counters_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.counters)
    }

    /// Renders the gauges as a flat JSON object.
    ///
    /// Gauges which evaluated to NaN or an infinite value are rendered as `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn gauges_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.gauges)
    }

    /// Converts a [`Snapshot`] into its counters and gauges.
    pub fn into_parts(self) -> (BTreeMap<String, u64>, BTreeMap<String, f64>) {
        (self.counters, self.gauges)
    }
}
