//! Completion policy: duration-dependent threshold and the one-shot
//! completion latch.
//!
//! - **Threshold**: `0.70 + 0.25 * min(duration, 600) / 600`, rising from
//!   0.70 for very short media to 0.95 at ten minutes and beyond.
//! - **Duration**: unset until `initialized`, then frozen.
//! - **Latch**: `NotCompleted -> Completed` happens once; there is no way back.

use chrono::{DateTime, Utc};

use crate::error::XapiError;

/// Threshold for media of (near) zero length.
pub const THRESHOLD_FLOOR: f64 = 0.70;
/// Amount added to the floor once the saturation length is reached.
pub const THRESHOLD_SPAN: f64 = 0.25;
/// Media length (seconds) at which the threshold stops growing.
pub const THRESHOLD_SATURATION_SECS: f64 = 600.0;

/// Fraction of `duration` that must be watched to count as completed.
pub fn completion_threshold(duration: f64) -> f64 {
    let capped = duration.clamp(0.0, THRESHOLD_SATURATION_SECS);
    THRESHOLD_FLOOR + THRESHOLD_SPAN * capped / THRESHOLD_SATURATION_SECS
}

// ─── MediaDuration ────────────────────────────────────────────────

/// Total media length. Set exactly once, to a strictly positive value.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum MediaDuration {
    #[default]
    Unset,
    Frozen {
        seconds: f64,
        threshold: f64,
    },
}

impl MediaDuration {
    /// Freeze the duration and derive its completion threshold.
    pub fn freeze(self, seconds: f64) -> Result<Self, XapiError> {
        match self {
            Self::Frozen { seconds: current, .. } => {
                Err(XapiError::DurationAlreadySet { current })
            }
            Self::Unset if !seconds.is_finite() || seconds <= 0.0 => {
                Err(XapiError::NonPositiveDuration(seconds))
            }
            Self::Unset => Ok(Self::Frozen {
                seconds,
                threshold: completion_threshold(seconds),
            }),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Frozen { .. })
    }

    /// Length in seconds; 0 while unset.
    pub fn seconds(&self) -> f64 {
        match self {
            Self::Unset => 0.0,
            Self::Frozen { seconds, .. } => *seconds,
        }
    }

    pub fn threshold(&self) -> Result<f64, XapiError> {
        match self {
            Self::Unset => Err(XapiError::ThresholdUnavailable),
            Self::Frozen { threshold, .. } => Ok(*threshold),
        }
    }
}

// ─── CompletionState ──────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    #[default]
    NotCompleted,
    Completed {
        at: DateTime<Utc>,
    },
}

impl CompletionState {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Whether `progress` crosses `threshold` for a session not yet completed.
    pub fn crosses(&self, progress: f64, threshold: f64) -> bool {
        match self {
            Self::NotCompleted => progress > threshold,
            Self::Completed { .. } => false,
        }
    }

    /// Latch completion. Returns `None` when already completed.
    pub fn complete(self, at: DateTime<Utc>) -> Option<Self> {
        match self {
            Self::NotCompleted => Some(Self::Completed { at }),
            Self::Completed { .. } => None,
        }
    }
}
