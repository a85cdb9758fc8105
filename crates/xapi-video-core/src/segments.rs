//! Played-segment tracking and progress calculation.
//!
//! Watched time is kept as a chronological list of closed intervals plus at
//! most one open interval. On the wire the list is encoded as
//! `start[.]end[,]start[.]end...`; the bracketed delimiters keep decimal
//! points and minus signs unambiguous.
//!
//! Intervals are stored in event order. A pair may arrive with
//! `start > end`; such a pair covers nothing when computing progress, and
//! is normalized only when producing the canonical merged list.

use std::fmt;

use crate::time::truncate_time;

/// Separator between two segments of the encoded list.
pub const SEGMENT_DELIMITER: &str = "[,]";
/// Separator between the bounds of a single segment.
pub const BOUND_DELIMITER: &str = "[.]";

// ─── Segment ──────────────────────────────────────────────────────

/// One closed interval of media time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Same interval with bounds in ascending order.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self::new(self.end, self.start)
        }
    }

    /// Covered length; never negative.
    pub fn length(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    fn parse(raw: &str) -> Option<Self> {
        let (start, end) = raw.split_once(BOUND_DELIMITER)?;
        let start = start.trim().parse::<f64>().ok()?;
        let end = end.trim().parse::<f64>().ok()?;
        if !start.is_finite() || !end.is_finite() {
            return None;
        }
        Some(Self::new(start, end))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{BOUND_DELIMITER}{}", self.start, self.end)
    }
}

// ─── PlayedSegments ───────────────────────────────────────────────

/// Ordered list of closed segments, as recorded (event order, unsorted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayedSegments(Vec<Segment>);

impl PlayedSegments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a closed segment, keeping event order.
    #[must_use]
    pub fn with(mut self, segment: Segment) -> Self {
        self.0.push(segment);
        self
    }

    /// Wire encoding of the closed segments.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join(SEGMENT_DELIMITER)
    }

    /// Decode the wire format.
    ///
    /// Fragments without a bound delimiter are open intervals and contribute
    /// nothing; unparseable fragments are skipped with a warning.
    pub fn decode(encoded: &str) -> Self {
        let segments = encoded
            .split(SEGMENT_DELIMITER)
            .map(str::trim)
            .filter(|raw| !raw.is_empty() && raw.contains(BOUND_DELIMITER))
            .filter_map(|raw| {
                let parsed = Segment::parse(raw);
                if parsed.is_none() {
                    tracing::warn!(fragment = raw, "skipping malformed played segment");
                }
                parsed
            })
            .collect();
        Self(segments)
    }

    /// Pairs sorted by their recorded start.
    fn sorted_by_start(pairs: impl Iterator<Item = Segment>) -> Vec<Segment> {
        let mut pairs: Vec<Segment> = pairs.collect();
        pairs.sort_by(|a, b| a.start.total_cmp(&b.start));
        pairs
    }

    /// Total watched time with overlaps counted once.
    ///
    /// Sweeps the raw pairs sorted by recorded start, clamping each start up
    /// to the previous end; a fully contained pair collapses to zero length
    /// and a reversed pair (`start > end`) contributes nothing.
    pub fn covered_length(&self) -> f64 {
        let mut pairs = Self::sorted_by_start(self.0.iter().copied());
        for i in 1..pairs.len() {
            let prev_end = pairs[i - 1].end;
            let current = &mut pairs[i];
            if current.start < prev_end {
                current.start = prev_end;
                if current.start > current.end {
                    current.end = current.start;
                }
            }
        }
        pairs.iter().map(Segment::length).sum()
    }

    /// Canonical form: sorted, normalized, overlapping or touching
    /// segments coalesced.
    pub fn merged(&self) -> Self {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.0.len());
        for segment in Self::sorted_by_start(self.0.iter().map(|s| s.normalized())) {
            match merged.last_mut() {
                Some(last) if segment.start <= last.end => {
                    last.end = last.end.max(segment.end);
                }
                _ => merged.push(segment),
            }
        }
        Self(merged)
    }

    /// Watched ratio of `duration`, in `[0, 1]`.
    ///
    /// A non-positive duration yields 0.
    pub fn progress(&self, duration: f64) -> f64 {
        if duration <= 0.0 || !duration.is_finite() {
            return 0.0;
        }
        (self.covered_length() / duration).clamp(0.0, 1.0)
    }
}

impl From<Vec<Segment>> for PlayedSegments {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

/// Progress of an encoded segment list against `duration`.
pub fn progress(encoded: &str, duration: f64) -> f64 {
    PlayedSegments::decode(encoded).progress(duration)
}

/// Re-encode an encoded segment list in canonical merged form.
pub fn encode_merged(encoded: &str) -> String {
    PlayedSegments::decode(encoded).merged().encode()
}

// ─── SegmentTracker ───────────────────────────────────────────────

/// Closed segments plus at most one open interval.
///
/// Transitions consume the tracker and return the next one, so a seek
/// (close, then reopen) is a single update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentTracker {
    closed: PlayedSegments,
    open: Option<f64>,
}

impl SegmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of the open interval, if any.
    pub fn open(&self) -> Option<f64> {
        self.open
    }

    pub fn closed(&self) -> &PlayedSegments {
        &self.closed
    }

    /// Open an interval at `time`. Any interval already open is discarded.
    /// Non-finite times are ignored.
    #[must_use]
    pub fn start(self, time: f64) -> Self {
        if !time.is_finite() {
            tracing::warn!(time, "ignoring non-finite interval start");
            return self;
        }
        let time = truncate_time(time);
        if let Some(stale) = self.open {
            tracing::debug!(stale, time, "open interval overwritten");
        }
        Self {
            closed: self.closed,
            open: Some(time),
        }
    }

    /// Close the open interval at `time`. No-op when nothing is open or
    /// `time` is not finite.
    #[must_use]
    pub fn end(self, time: f64) -> Self {
        if !time.is_finite() {
            tracing::warn!(time, "ignoring non-finite interval end");
            return self;
        }
        match self.open {
            Some(start) => Self {
                closed: self
                    .closed
                    .with(Segment::new(start, truncate_time(time))),
                open: None,
            },
            None => self,
        }
    }

    /// Close the current interval at `from` and open a new one at `to`.
    #[must_use]
    pub fn seek(self, from: f64, to: f64) -> Self {
        self.end(from).start(to)
    }

    /// Encoded list including the open interval's start, if one is open.
    pub fn played_segments(&self) -> String {
        let closed = self.closed.encode();
        match self.open {
            Some(start) if closed.is_empty() => start.to_string(),
            Some(start) => format!("{closed}{SEGMENT_DELIMITER}{start}"),
            None => closed,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
