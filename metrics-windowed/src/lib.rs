//! In-process registry of counters, lazily-evaluated gauges, and windowed histograms.
//!
//! `metrics-windowed` keeps every metric of a service in memory, and hands out point-in-time
//! snapshots of them for reporting, typically as two flat JSON documents: one for counters and one
//! for gauges.
//!
//! # Design
//!
//! Callers create a [`Registry`] through its [`Builder`].  The registry hands out typed handles
//! for updating metrics, and [`Controller`]s for getting snapshots out.  It also owns a background
//! thread which rotates histogram windows, stopped by [`Registry::close`] or when the registry is
//! dropped.
//!
//! # Metrics
//!
//! Counters are monotonic, unsigned integers that start at 0 and only ever increase.
//!
//! Gauges hold a function rather than a value: the function is evaluated whenever gauges are
//! snapshotted.  Gauges can share an initializer by using the same batch key, which lets several
//! gauges be backed by one expensive refresh that runs exactly once per snapshot.
//!
//! Histograms track the distribution of values recorded within a rolling time window, using a
//! fixed amount of memory with a bounded relative error.  Every histogram comes with one gauge per
//! quantile, named after the histogram: `<name>.P50`, `<name>.P75`, `<name>.P90`, `<name>.P95`,
//! `<name>.P99`, and `<name>.P999` by default.
//!
//! ```rust
//! use metrics_windowed::Registry;
//!
//! let registry = Registry::builder().build().expect("failed to create registry");
//!
//! // Counters only go up.
//! let requests = registry.counter("requests");
//! requests.increment();
//! requests.add(10);
//!
//! // Gauges are either set to a value, or to a function evaluated at snapshot time.
//! registry.gauge("pool.size").set(16.0);
//! registry.gauge("pool.idle").set_fn(|| 4.0);
//!
//! // Histograms accept values within the range they were created with.
//! let latency = registry.histogram("latency_us", 1, 1_000_000, 3).expect("failed to create histogram");
//! latency.record(420).expect("value in range");
//! assert!(latency.record(0).is_err());
//!
//! let snapshot = registry.controller().snapshot();
//! assert_eq!(snapshot.counters()["requests"], 11);
//! assert_eq!(snapshot.gauges()["pool.size"], 16.0);
//! assert_eq!(snapshot.gauges()["latency_us.P99"], 420.0);
//!
//! println!("{}", snapshot.counters_json().expect("failed to render counters"));
//! registry.close();
//! ```
//!
//! # Windows
//!
//! Each histogram records into a current slice.  Every rotation interval, the current slice is
//! retired into a ring holding the most recent past slices, dropping the oldest one, and quantiles
//! are computed over the current slice and the whole ring.  The window size counts the current
//! slice, so with the defaults of five slices rotated every minute, quantiles cover the last five
//! minutes of data, and a value is dropped on the fifth rotation after it was recorded.
//!
//! # Locking
//!
//! Gauge functions and batch initializers run while the registry holds its gauge and histogram
//! locks.  They must be fast, and must not call back into the registry.
#![deny(missing_docs)]
#![warn(unused_extern_crates)]
mod bucket;
mod builder;
mod config;
mod control;
mod data;
mod errors;
mod quantile;
mod registry;
mod rotator;

pub use self::{
    bucket::BucketedHistogram,
    builder::{BuildError, Builder},
    control::Controller,
    data::{BatchKey, Counter, Gauge, Histogram, Snapshot},
    errors::{HistogramError, RecordError},
    quantile::{parse_quantiles, Quantile, DEFAULT_QUANTILES},
    registry::Registry,
};
