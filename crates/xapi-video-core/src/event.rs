//! Player lifecycle events and the trait both session kinds implement.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::XapiError;
use crate::statement::ContextExtensions;

/// One player lifecycle event, as fired by the player with its media time.
///
/// Serialized with an `event` tag, one JSON object per line in replay logs:
/// `{"event": "seeked", "from": 5.0, "to": 12.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PlayerEvent {
    Initialized {
        /// Media length in seconds. Required for on-demand media, ignored for live.
        #[serde(default)]
        length: Option<f64>,
        #[serde(default)]
        context: ContextExtensions,
    },
    Played {
        time: f64,
    },
    Paused {
        time: f64,
    },
    Seeked {
        from: f64,
        to: f64,
    },
    Completed {
        time: f64,
    },
    Terminated {
        time: f64,
    },
    Interacted {
        time: f64,
        #[serde(default)]
        context: ContextExtensions,
    },
    Downloaded {
        quality: u32,
    },
}

impl PlayerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "initialized",
            Self::Played { .. } => "played",
            Self::Paused { .. } => "paused",
            Self::Seeked { .. } => "seeked",
            Self::Completed { .. } => "completed",
            Self::Terminated { .. } => "terminated",
            Self::Interacted { .. } => "interacted",
            Self::Downloaded { .. } => "downloaded",
        }
    }
}

impl FromStr for PlayerEvent {
    type Err = XapiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s.trim()).map_err(|e| XapiError::InvalidEvent(e.to_string()))
    }
}

/// A statement session that can be driven by a stream of player events.
pub trait StatementSession {
    /// Route one event to the matching lifecycle method.
    fn apply(&mut self, event: &PlayerEvent) -> Result<(), XapiError>;

    /// Encoded played segments, including the open interval if any.
    fn played_segments(&self) -> String;
}
