//! Errors raised while validating settings or designing filters.
//!
//! Numerical degeneracy (an all-zero signal reaching normalization, a band that
//! collapses after clamping) is handled where it happens and never surfaces here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("Invalid sample rate: {0} Hz (must be greater than 0)")]
    InvalidSampleRate(u32),

    #[error("Invalid duration: {0} s (must be finite and greater than 0)")]
    InvalidDuration(f64),

    #[error("Invalid amplitude for {label}: {value} (expected [0, 1])")]
    InvalidAmplitude { label: String, value: f64 },

    #[error("Invalid frequency range for {label}: ({low}, {high}) Hz")]
    InvalidRange { label: String, low: f64, high: f64 },

    #[error("Invalid parameter {label}: {reason}")]
    InvalidParameter { label: String, reason: String },

    #[error("Filter design failed: {0}")]
    Filter(String),
}

impl SynthError {
    pub fn range(label: &str, low: f64, high: f64) -> Self {
        SynthError::InvalidRange { label: label.to_string(), low, high }
    }

    pub fn parameter(label: &str, reason: impl Into<String>) -> Self {
        SynthError::InvalidParameter { label: label.to_string(), reason: reason.into() }
    }
}
