//! Error types for simulator construction, configuration, and output

use thiserror::Error;

/// Errors that can occur while building or observing a simulation
///
/// Stepping never produces one of these: numerical trouble inside a step
/// shows up as non-finite cell values instead.
#[derive(Error, Debug)]
pub enum SimError {
    /// The grid side length is zero
    #[error("grid size must be a positive integer, got {0}")]
    InvalidGridSize(usize),

    /// The grid has more cells than can be addressed
    #[error("grid size {0} is too large")]
    GridTooLarge(usize),

    /// A parameter is NaN or infinite
    #[error("parameter `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// A parameter is finite but outside its allowed range
    #[error("parameter `{name}` must be {requirement}, got {value}")]
    OutOfRange {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A snapshot could not be written
    #[error("write error: {0}")]
    Write(String),

    /// No usable GPU adapter or device
    #[error("GPU unavailable: {0}")]
    GpuUnavailable(String),

    /// A GPU operation failed after the device was created
    #[error("GPU error: {0}")]
    Gpu(String),
}

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;
