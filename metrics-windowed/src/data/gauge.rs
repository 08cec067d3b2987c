use std::fmt;
use std::sync::Arc;

use crate::registry::MetricRegistry;

/// Function evaluated to get the value of a gauge.
pub(crate) type Evaluator = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Function run once per snapshot ahead of the gauges of a batch.
pub(crate) type Initializer = Arc<dyn Fn() + Send + Sync>;

/// An opaque key grouping gauges that share an initializer.
///
/// See [`Gauge::set_batch_fn`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchKey(String);

impl BatchKey {
    /// Creates a new [`BatchKey`].
    pub fn new<K: Into<String>>(key: K) -> Self {
        BatchKey(key.into())
    }

    /// Gets the string form of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BatchKey {
    fn from(key: &str) -> Self {
        BatchKey::new(key)
    }
}

impl From<String> for BatchKey {
    fn from(key: String) -> Self {
        BatchKey(key)
    }
}

/// A reference to a [`Gauge`].
///
/// A [`Gauge`] is an instantaneous measurement of something, as a 64-bit floating-point value.
/// Rather than holding a value, a gauge holds a function which is evaluated whenever gauges are
/// snapshotted, so setting a gauge means installing a new function for it.
///
/// Functions are called while the registry holds its gauge and histogram locks: they must be fast,
/// and must not call back into the registry.
#[derive(Clone)]
pub struct Gauge {
    name: Arc<str>,
    registry: Arc<MetricRegistry>,
}

impl Gauge {
    pub(crate) fn new(name: Arc<str>, registry: Arc<MetricRegistry>) -> Self {
        Self { name, registry }
    }

    /// Sets the gauge to the given value.
    pub fn set(&self, value: f64) {
        self.registry.set_gauge(&self.name, Arc::new(move || value));
    }

    /// Sets the gauge to the lazily-computed return value of `f`.
    pub fn set_fn<F>(&self, f: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.registry.set_gauge(&self.name, Arc::new(f));
    }

    /// Sets the gauge to the lazily-computed return value of `f`, as part of a batch.
    ///
    /// All gauges registered with the same `key` share one initializer, `init`, which is run
    /// exactly once per snapshot before any gauge is evaluated, no matter how many gauges belong
    /// to the batch.  This lets an expensive refresh, such as a single system call, back several
    /// gauges.
    ///
    /// The first initializer registered for a key wins: `init` is dropped if the key already has
    /// one.  Initializers must be idempotent.
    pub fn set_batch_fn<K, I, F>(&self, key: K, init: I, f: F)
    where
        K: Into<BatchKey>,
        I: Fn() + Send + Sync + 'static,
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.registry.set_batch_gauge(&self.name, key.into(), Arc::new(init), Arc::new(f));
    }

    /// Gets the name of the gauge.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge").field("name", &self.name).finish()
    }
}
