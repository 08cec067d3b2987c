use std::time::Duration;

use crate::quantile::{parse_quantiles, Quantile};
use crate::Builder;

/// Holds the configuration for a registry.
#[derive(Clone, Debug)]
pub(crate) struct Configuration {
    pub window_slices: usize,
    pub rotation_interval: Duration,
    pub quantiles: Vec<Quantile>,
    pub rotator: bool,
}

impl Configuration {
    pub fn from_builder(builder: &Builder) -> Self {
        Self {
            window_slices: builder.window_slices,
            rotation_interval: builder.rotation_interval,
            quantiles: parse_quantiles(&builder.quantiles),
            rotator: builder.rotator,
        }
    }

    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self {
            window_slices: 5,
            rotation_interval: Duration::from_secs(60),
            quantiles: parse_quantiles(crate::quantile::DEFAULT_QUANTILES),
            rotator: false,
        }
    }
}
