use thiserror::Error;

/// Errors that could occur while recording a value into a histogram.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The value fell outside of the range the histogram was created with.
    ///
    /// The value is dropped; the histogram is left untouched.
    #[error("value {value} is outside of the histogram range [{min}, {max}]")]
    OutOfRange {
        /// The rejected value.
        value: u64,
        /// Lowest value the histogram accepts.
        min: u64,
        /// Highest value the histogram accepts.
        max: u64,
    },
}

/// Errors that could occur while creating a histogram.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HistogramError {
    /// A histogram with the same name is already registered.
    #[error("histogram `{name}` already exists")]
    AlreadyExists {
        /// Name of the existing histogram.
        name: String,
    },

    /// The requested range cannot be tracked.
    #[error("invalid histogram range [{min}, {max}]")]
    InvalidBounds {
        /// Requested lowest value.
        min: u64,
        /// Requested highest value.
        max: u64,
    },

    /// The requested precision is not supported.
    #[error("invalid histogram precision of {sigfigs} significant figures, must be at most 5")]
    InvalidPrecision {
        /// Requested number of significant figures.
        sigfigs: u8,
    },
}
