//! Core data types for metrics.
mod counter;
pub use counter::Counter;

mod gauge;
pub(crate) use gauge::{Evaluator, Initializer};
pub use gauge::{BatchKey, Gauge};

mod histogram;
pub use histogram::Histogram;

mod snapshot;
pub use snapshot::Snapshot;
