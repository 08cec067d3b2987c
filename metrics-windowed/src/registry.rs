use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::bucket::BucketedHistogram;
use crate::config::Configuration;
use crate::data::{BatchKey, Counter, Evaluator, Gauge, Histogram, Initializer, Snapshot};
use crate::errors::HistogramError;
use crate::quantile::register_quantile_gauges;
use crate::rotator::Rotator;
use crate::{BuildError, Builder, Controller};

/// Gauge functions by name, and batch initializers by key.
#[derive(Default)]
pub(crate) struct GaugeTable {
    evaluators: HashMap<String, Evaluator>,
    initializers: HashMap<BatchKey, Initializer>,
}

impl GaugeTable {
    pub fn set(&mut self, name: &str, evaluator: Evaluator) {
        self.evaluators.insert(name.to_owned(), evaluator);
    }

    /// Installs `evaluator`, and `initializer` unless `key` already has one.
    pub fn set_batch(
        &mut self,
        name: &str,
        key: BatchKey,
        initializer: Initializer,
        evaluator: Evaluator,
    ) {
        self.set(name, evaluator);
        self.initializers.entry(key).or_insert(initializer);
    }
}

/// Storage for every metric of a [`Registry`].
///
/// Each namespace sits behind its own lock.  Whenever more than one is held, they are acquired in
/// the order counters, gauges, histograms, and only then any individual histogram's lock.
pub(crate) struct MetricRegistry {
    config: Configuration,
    counters: Mutex<HashMap<String, u64>>,
    gauges: Mutex<GaugeTable>,
    histograms: Mutex<HashMap<String, Histogram>>,
}

impl MetricRegistry {
    pub fn new(config: Configuration) -> Self {
        MetricRegistry {
            config,
            counters: Mutex::new(HashMap::new()),
            gauges: Mutex::new(GaugeTable::default()),
            histograms: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_counter(&self, name: &str, delta: u64) {
        let mut counters = self.counters.lock();
        match counters.get_mut(name) {
            Some(value) => *value = value.saturating_add(delta),
            None => {
                counters.insert(name.to_owned(), delta);
            }
        }
    }

    pub fn counter_value(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn set_gauge(&self, name: &str, evaluator: Evaluator) {
        self.gauges.lock().set(name, evaluator);
    }

    pub fn set_batch_gauge(
        &self,
        name: &str,
        key: BatchKey,
        initializer: Initializer,
        evaluator: Evaluator,
    ) {
        self.gauges.lock().set_batch(name, key, initializer, evaluator);
    }

    pub fn register_histogram(
        &self,
        name: String,
        min: u64,
        max: u64,
        sigfigs: u8,
    ) -> Result<Histogram, HistogramError> {
        // Both locks are held until the quantile gauges are in place, so that a concurrent reset
        // or snapshot sees either the histogram with all of its gauges, or neither.
        let mut gauges = self.gauges.lock();
        let mut histograms = self.histograms.lock();
        if histograms.contains_key(&name) {
            debug!(name = %name, "Histogram already registered.");
            return Err(HistogramError::AlreadyExists { name });
        }

        let buckets = BucketedHistogram::new(min, max, sigfigs)?;
        let histogram = Histogram::new(name.clone(), buckets, self.config.window_slices);
        register_quantile_gauges(&mut gauges, &histogram, &self.config.quantiles);
        histograms.insert(name, histogram.clone());

        debug!(name = histogram.name(), min, max, sigfigs, "Registered histogram.");
        Ok(histogram)
    }

    pub fn counters(&self) -> BTreeMap<String, u64> {
        self.counters.lock().iter().map(|(name, value)| (name.clone(), *value)).collect()
    }

    pub fn gauges(&self) -> BTreeMap<String, f64> {
        let gauges = self.gauges.lock();

        // Held for the whole pass so that no histogram is rotated or registered between its merge
        // and the evaluation of its quantiles.
        let _histograms = self.histograms.lock();

        for initializer in gauges.initializers.values() {
            initializer();
        }

        gauges
            .evaluators
            .iter()
            .map(|(name, evaluator)| (name.clone(), evaluator()))
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let counters = self.counters();
        let gauges = self.gauges();
        Snapshot::new(counters, gauges)
    }

    pub fn rotate_histograms(&self) -> usize {
        let histograms = self.histograms.lock();
        for histogram in histograms.values() {
            histogram.rotate();
        }
        histograms.len()
    }

    pub fn reset(&self) {
        let mut counters = self.counters.lock();
        let mut gauges = self.gauges.lock();
        let mut histograms = self.histograms.lock();

        *counters = HashMap::new();
        *gauges = GaugeTable::default();
        *histograms = HashMap::new();

        debug!("Registry reset.");
    }
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("config", &self.config)
            .field("counters", &self.counters.lock().len())
            .field("gauges", &self.gauges.lock().evaluators.len())
            .field("histograms", &self.histograms.lock().len())
            .finish()
    }
}

/// Central store of counters, gauges, and windowed histograms.
///
/// A [`Registry`] is created through [`Builder`], and hands out typed handles for recording
/// metrics and [`Controller`]s for reading them.  Unless disabled, it owns a background thread
/// which rotates every histogram's window at a fixed interval; the thread is stopped when the
/// registry is closed or dropped.
///
/// Metrics are addressed by name, and counters, gauges, and histograms each live in their own
/// namespace.
pub struct Registry {
    inner: Arc<MetricRegistry>,
    rotator: Mutex<Option<Rotator>>,
}

impl Registry {
    /// Creates a [`Builder`] for building a [`Registry`].
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn from_config(config: Configuration) -> Result<Registry, BuildError> {
        let interval = config.rotation_interval;
        let spawn_rotator = config.rotator;
        let inner = Arc::new(MetricRegistry::new(config));

        let rotator =
            if spawn_rotator { Some(Rotator::spawn(inner.clone(), interval)?) } else { None };

        Ok(Registry { inner, rotator: Mutex::new(rotator) })
    }

    /// Gets a handle to the counter with the given name.
    ///
    /// The counter itself is created the first time it is updated.
    pub fn counter<N: Into<String>>(&self, name: N) -> Counter {
        let name: String = name.into();
        Counter::new(name.into(), self.inner.clone())
    }

    /// Gets a handle to the gauge with the given name.
    ///
    /// The gauge itself is created the first time it is set.
    pub fn gauge<N: Into<String>>(&self, name: N) -> Gauge {
        let name: String = name.into();
        Gauge::new(name.into(), self.inner.clone())
    }

    /// Creates a new windowed histogram accepting values in `[min, max]`, with `sigfigs`
    /// significant figures of precision.
    ///
    /// On top of the histogram itself, one gauge per configured quantile is registered, named
    /// `<name>.<label>`: `<name>.P50`, `<name>.P99`, and so on.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::AlreadyExists`] if a histogram is already registered under
    /// `name`, or an error describing why the range or precision was rejected.
    pub fn histogram<N: Into<String>>(
        &self,
        name: N,
        min: u64,
        max: u64,
        sigfigs: u8,
    ) -> Result<Histogram, HistogramError> {
        self.inner.register_histogram(name.into(), min, max, sigfigs)
    }

    /// Increments the counter with the given name by `delta`.
    pub fn add_counter(&self, name: &str, delta: u64) {
        self.inner.add_counter(name, delta);
    }

    /// Takes a snapshot of every counter.
    pub fn counters(&self) -> BTreeMap<String, u64> {
        self.inner.counters()
    }

    /// Takes a snapshot of every gauge.
    ///
    /// Every batch initializer runs once, histograms are merged, and then every gauge function is
    /// evaluated.  Panics raised by gauge functions or initializers are propagated to the caller.
    pub fn gauges(&self) -> BTreeMap<String, f64> {
        self.inner.gauges()
    }

    /// Takes a snapshot of every counter and gauge.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshot()
    }

    /// Gets a [`Controller`] for taking snapshots of this registry.
    pub fn controller(&self) -> Controller {
        Controller::new(self.inner.clone())
    }

    /// Removes every counter, gauge, batch initializer, and histogram.
    ///
    /// Counter and gauge handles stay usable and recreate their metric on the next update.
    /// Histogram handles keep recording, but their histograms are no longer part of the registry.
    pub fn reset(&self) {
        self.inner.reset();
    }

    /// Stops the histogram rotator, waiting for its thread to exit.
    ///
    /// Metrics stay readable and writable afterwards, but histograms no longer rotate.  Closing a
    /// registry more than once has no further effect.
    pub fn close(&self) {
        if let Some(mut rotator) = self.rotator.lock().take() {
            rotator.stop();
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("metrics", &self.inner)
            .field("rotator", &self.rotator.lock().is_some())
            .finish()
    }
}
