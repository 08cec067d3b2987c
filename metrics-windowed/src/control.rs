use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{data::Snapshot, registry::MetricRegistry};

/// Handle for acquiring snapshots.
///
/// `Controller` is cheap to clone and only gives read access to a registry, which makes it the
/// handle to pass to reporters such as an HTTP endpoint serving [`Snapshot::counters_json`] and
/// [`Snapshot::gauges_json`].
#[derive(Clone)]
pub struct Controller {
    metric_registry: Arc<MetricRegistry>,
}

impl Controller {
    pub(crate) fn new(metric_registry: Arc<MetricRegistry>) -> Controller {
        Controller { metric_registry }
    }

    /// Takes a snapshot of every counter.
    pub fn counters(&self) -> BTreeMap<String, u64> {
        self.metric_registry.counters()
    }

    /// Takes a snapshot of every gauge.
    pub fn gauges(&self) -> BTreeMap<String, f64> {
        self.metric_registry.gauges()
    }

    /// Provide a snapshot of its collected metrics.
    pub fn snapshot(&self) -> Snapshot {
        self.metric_registry.snapshot()
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller").finish_non_exhaustive()
    }
}
