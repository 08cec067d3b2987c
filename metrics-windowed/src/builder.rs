use std::{io, time::Duration};

use thiserror::Error;

use crate::{config::Configuration, quantile::DEFAULT_QUANTILES, Registry};

const DEFAULT_WINDOW_SLICES: usize = 5;
const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(60);

/// Errors that could occur while building a [`Registry`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The rotation interval was zero.
    #[error("histogram rotation interval must be non-zero")]
    InvalidRotationInterval,

    /// Failed to spawn the background thread which rotates histograms.
    #[error("failed to spawn histogram rotator thread: {0}")]
    RotatorSpawn(#[from] io::Error),
}

/// Builder for [`Registry`].
#[derive(Clone, Debug)]
pub struct Builder {
    pub(crate) window_slices: usize,
    pub(crate) rotation_interval: Duration,
    pub(crate) quantiles: Vec<f64>,
    pub(crate) rotator: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            window_slices: DEFAULT_WINDOW_SLICES,
            rotation_interval: DEFAULT_ROTATION_INTERVAL,
            quantiles: DEFAULT_QUANTILES.to_vec(),
            rotator: true,
        }
    }
}

impl Builder {
    /// Creates a new [`Builder`] with default values.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the number of slices in each histogram's window, counting the slice being recorded
    /// into.
    ///
    /// Defaults to 5.
    ///
    /// Together with the rotation interval, this controls how long of a time window histograms
    /// track data for.  With the default values, histograms span five minutes of data, and drop a
    /// minute's worth of data at a time as the window rolls forward.  A value of 0 behaves like 1:
    /// every rotation clears the histogram.
    #[must_use]
    pub fn window_slices(mut self, slices: usize) -> Self {
        self.window_slices = slices;
        self
    }

    /// Sets the interval between histogram rotations.
    ///
    /// Defaults to 60 seconds.
    #[must_use]
    pub fn rotation_interval(mut self, interval: Duration) -> Self {
        self.rotation_interval = interval;
        self
    }

    /// Sets the quantiles exposed as gauges for every histogram.
    ///
    /// Quantiles represent a scale of 0 to 1, where percentiles represent a scale of 1 to 100, so
    /// a quantile of 0.99 is the 99th percentile, and a quantile of 0.999 is the 99.9th percentile.
    ///
    /// Defaults to 0.5, 0.75, 0.9, 0.95, 0.99, and 0.999, which produce gauges suffixed with
    /// `.P50`, `.P75`, `.P90`, `.P95`, `.P99`, and `.P999`.
    #[must_use]
    pub fn quantiles(mut self, quantiles: &[f64]) -> Self {
        self.quantiles = quantiles.to_vec();
        self
    }

    /// Disables the background thread which rotates histograms.
    ///
    /// Histograms of the resulting registry never drop old data.
    #[must_use]
    pub fn without_rotator(mut self) -> Self {
        self.rotator = false;
        self
    }

    /// Creates a [`Registry`] based on this configuration.
    ///
    /// # Errors
    ///
    /// If the rotation interval is zero, or if the rotator thread cannot be spawned, an error is
    /// returned.
    pub fn build(self) -> Result<Registry, BuildError> {
        if self.rotator && self.rotation_interval.is_zero() {
            return Err(BuildError::InvalidRotationInterval);
        }

        let config = Configuration::from_builder(&self);
        Registry::from_config(config)
    }
}
