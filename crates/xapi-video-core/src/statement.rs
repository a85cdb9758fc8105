//! xAPI statement payload: verbs, extension IRIs, and the player context
//! reported alongside them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Extension map keyed by IRI.
pub type Extensions = serde_json::Map<String, Value>;

// ─── Extension IRIs ───────────────────────────────────────────────

/// Fixed extension IRIs from the xAPI video profile.
pub mod extensions {
    pub const SESSION_ID: &str = "https://w3id.org/xapi/video/extensions/session-id";
    pub const LENGTH: &str = "https://w3id.org/xapi/video/extensions/length";
    pub const TIME: &str = "https://w3id.org/xapi/video/extensions/time";
    pub const TIME_FROM: &str = "https://w3id.org/xapi/video/extensions/time-from";
    pub const TIME_TO: &str = "https://w3id.org/xapi/video/extensions/time-to";
    pub const PLAYED_SEGMENTS: &str = "https://w3id.org/xapi/video/extensions/played-segments";
    pub const PROGRESS: &str = "https://w3id.org/xapi/video/extensions/progress";
    pub const COMPLETION_THRESHOLD: &str =
        "https://w3id.org/xapi/video/extensions/completion-threshold";
    pub const QUALITY: &str = "https://w3id.org/xapi/video/extensions/quality";
    pub const SPEED: &str = "https://w3id.org/xapi/video/extensions/speed";
    pub const VOLUME: &str = "https://w3id.org/xapi/video/extensions/volume";
    pub const FULL_SCREEN: &str = "https://w3id.org/xapi/video/extensions/full-screen";
    pub const CC_SUBTITLE_ENABLED: &str =
        "https://w3id.org/xapi/video/extensions/cc-subtitle-enabled";
    pub const CC_SUBTITLE_LANG: &str = "https://w3id.org/xapi/video/extensions/cc-subtitle-lang";
    pub const FRAME_RATE: &str = "https://w3id.org/xapi/video/extensions/frame-rate";
    pub const SCREEN_SIZE: &str = "https://w3id.org/xapi/video/extensions/screen-size";
    pub const VIDEO_PLAYBACK_SIZE: &str =
        "https://w3id.org/xapi/video/extensions/video-playback-size";
    pub const TRACK: &str = "https://w3id.org/xapi/video/extensions/track";
    pub const USER_AGENT: &str = "https://w3id.org/xapi/video/extensions/user-agent";
}

// ─── Verb ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbKind {
    Initialized,
    Played,
    Paused,
    Seeked,
    Completed,
    Terminated,
    Interacted,
    Downloaded,
}

impl VerbKind {
    pub const ALL: [Self; 8] = [
        Self::Initialized,
        Self::Played,
        Self::Paused,
        Self::Seeked,
        Self::Completed,
        Self::Terminated,
        Self::Interacted,
        Self::Downloaded,
    ];

    pub fn iri(self) -> &'static str {
        match self {
            Self::Initialized => "http://adlnet.gov/expapi/verbs/initialized",
            Self::Played => "https://w3id.org/xapi/video/verbs/played",
            Self::Paused => "https://w3id.org/xapi/video/verbs/paused",
            Self::Seeked => "https://w3id.org/xapi/video/verbs/seeked",
            Self::Completed => "http://adlnet.gov/expapi/verbs/completed",
            Self::Terminated => "http://adlnet.gov/expapi/verbs/terminated",
            Self::Interacted => "http://adlnet.gov/expapi/verbs/interacted",
            Self::Downloaded => "http://id.tincanapi.com/verb/downloaded",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Played => "played",
            Self::Paused => "paused",
            Self::Seeked => "seeked",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
            Self::Interacted => "interacted",
            Self::Downloaded => "downloaded",
        }
    }
}

impl fmt::Display for VerbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire form of a verb: IRI plus a language map of display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verb {
    pub id: String,
    pub display: BTreeMap<String, String>,
}

impl From<VerbKind> for Verb {
    fn from(kind: VerbKind) -> Self {
        Self {
            id: kind.iri().to_string(),
            display: BTreeMap::from([("en-US".to_string(), kind.as_str().to_string())]),
        }
    }
}

// ─── Context extensions ───────────────────────────────────────────

/// Player context reported with `initialized` and `interacted`.
///
/// Only fields that are set end up in the statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextExtensions {
    pub quality: Option<u32>,
    pub speed: Option<String>,
    pub volume: Option<f64>,
    pub full_screen: Option<bool>,
    pub cc_subtitle_enabled: Option<bool>,
    pub cc_subtitle_lang: Option<String>,
    pub frame_rate: Option<f64>,
    pub screen_size: Option<String>,
    pub video_playback_size: Option<String>,
    pub track: Option<String>,
    pub user_agent: Option<String>,
}

impl ContextExtensions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Insert every set field under its IRI.
    pub fn write_into(&self, target: &mut Extensions) {
        fn put(target: &mut Extensions, iri: &str, value: Option<Value>) {
            if let Some(value) = value {
                target.insert(iri.to_string(), value);
            }
        }
        put(target, extensions::QUALITY, self.quality.map(Value::from));
        put(target, extensions::SPEED, self.speed.clone().map(Value::from));
        put(target, extensions::VOLUME, self.volume.map(Value::from));
        put(target, extensions::FULL_SCREEN, self.full_screen.map(Value::from));
        put(
            target,
            extensions::CC_SUBTITLE_ENABLED,
            self.cc_subtitle_enabled.map(Value::from),
        );
        put(
            target,
            extensions::CC_SUBTITLE_LANG,
            self.cc_subtitle_lang.clone().map(Value::from),
        );
        put(target, extensions::FRAME_RATE, self.frame_rate.map(Value::from));
        put(
            target,
            extensions::SCREEN_SIZE,
            self.screen_size.clone().map(Value::from),
        );
        put(
            target,
            extensions::VIDEO_PLAYBACK_SIZE,
            self.video_playback_size.clone().map(Value::from),
        );
        put(target, extensions::TRACK, self.track.clone().map(Value::from));
        put(
            target,
            extensions::USER_AGENT,
            self.user_agent.clone().map(Value::from),
        );
    }
}

// ─── Statement ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementContext {
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    pub extensions: Extensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,
    /// ISO-8601 duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl StatementResult {
    pub fn with_extension(mut self, iri: &str, value: impl Into<Value>) -> Self {
        self.extensions.insert(iri.to_string(), value.into());
        self
    }

    /// Look up a result extension by IRI.
    pub fn extension(&self, iri: &str) -> Option<&Value> {
        self.extensions.get(iri)
    }
}

/// One xAPI statement as sent to the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub verb: Verb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<StatementContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StatementResult>,
}

impl Statement {
    pub fn new(verb: VerbKind) -> Self {
        Self {
            id: None,
            timestamp: None,
            verb: verb.into(),
            context: None,
            result: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, extensions: Extensions) -> Self {
        self.context = Some(StatementContext { extensions });
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: StatementResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Attach a fresh id and the given timestamp.
    #[must_use]
    pub fn stamped(mut self, timestamp: DateTime<Utc>) -> Self {
        self.id = Some(Uuid::new_v4());
        self.timestamp = Some(timestamp);
        self
    }

    /// Verb kind, recovered from the verb IRI.
    pub fn verb_kind(&self) -> Option<VerbKind> {
        VerbKind::ALL.into_iter().find(|k| k.iri() == self.verb.id)
    }

    pub fn context_extension(&self, iri: &str) -> Option<&Value> {
        self.context.as_ref()?.extensions.get(iri)
    }

    pub fn result_extension(&self, iri: &str) -> Option<&Value> {
        self.result.as_ref()?.extension(iri)
    }
}
