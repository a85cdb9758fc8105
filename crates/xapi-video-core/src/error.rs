//! Error types for the statement engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum XapiError {
    #[error("duration is immutable once set (already {current}s)")]
    DurationAlreadySet { current: f64 },

    #[error("duration must be strictly positive, got {0}")]
    NonPositiveDuration(f64),

    #[error("completion threshold is unavailable until the duration is set")]
    ThresholdUnavailable,

    #[error("invalid played segment: {0}")]
    InvalidSegment(String),

    #[error("invalid player event: {0}")]
    InvalidEvent(String),
}
