use std::fmt;
use std::sync::Arc;

use crate::registry::MetricRegistry;

/// A reference to a [`Counter`].
///
/// A [`Counter`] is a monotonically increasing, unsigned 64-bit integer, used to track the number
/// of times something happened.  Rates are derived by an aggregation layer from the deltas between
/// two snapshots.
///
/// The handle refers to the counter by name, so it keeps working after the registry is reset: the
/// next update simply creates the counter again.
#[derive(Clone)]
pub struct Counter {
    name: Arc<str>,
    registry: Arc<MetricRegistry>,
}

impl Counter {
    pub(crate) fn new(name: Arc<str>, registry: Arc<MetricRegistry>) -> Self {
        Self { name, registry }
    }

    /// Increments the counter by one.
    pub fn increment(&self) {
        self.add(1);
    }

    /// Increments the counter by `value`.
    ///
    /// The counter saturates at `u64::MAX` rather than wrapping around.
    pub fn add(&self, value: u64) {
        self.registry.add_counter(&self.name, value);
    }

    /// Gets the current value of the counter.
    pub fn value(&self) -> u64 {
        self.registry.counter_value(&self.name)
    }

    /// Gets the name of the counter.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter").field("name", &self.name).finish()
    }
}
