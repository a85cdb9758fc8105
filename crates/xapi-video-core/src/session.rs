//! Statement session for on-demand media.
//!
//! Owns the segment tracker, the frozen duration with its completion
//! threshold, and the completion latch. Each lifecycle method updates state,
//! assembles one statement and hands it to the transport.
//!
//! Nothing is sent before `initialized`: while the duration is unset,
//! state still updates but statements are dropped.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::completion::{CompletionState, MediaDuration};
use crate::error::XapiError;
use crate::event::{PlayerEvent, StatementSession};
use crate::segments::SegmentTracker;
use crate::statement::{
    ContextExtensions, Extensions, Statement, StatementResult, VerbKind, extensions,
};
use crate::time::{Clock, SystemClock, truncate_time};
use crate::transport::Transport;

pub struct VideoSession<T, C = SystemClock> {
    session_id: String,
    transport: T,
    clock: C,
    duration: MediaDuration,
    tracker: SegmentTracker,
    started_at: Option<DateTime<Utc>>,
    completion: CompletionState,
}

impl<T: Transport> VideoSession<T, SystemClock> {
    pub fn new(session_id: impl Into<String>, transport: T) -> Self {
        Self::with_clock(session_id, transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> VideoSession<T, C> {
    pub fn with_clock(session_id: impl Into<String>, transport: T, clock: C) -> Self {
        Self {
            session_id: session_id.into(),
            transport,
            clock,
            duration: MediaDuration::Unset,
            tracker: SegmentTracker::new(),
            started_at: None,
            completion: CompletionState::NotCompleted,
        }
    }

    // ─── Accessors ────────────────────────────────────────────────

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Media length in seconds; 0 until `initialized`.
    pub fn duration(&self) -> f64 {
        self.duration.seconds()
    }

    pub fn completion_threshold(&self) -> Result<f64, XapiError> {
        self.duration.threshold()
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_completed()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn tracker(&self) -> &SegmentTracker {
        &self.tracker
    }

    /// Encoded played segments, with the open interval's start appended.
    pub fn played_segments(&self) -> String {
        self.tracker.played_segments()
    }

    /// Watched ratio over closed segments.
    pub fn progress(&self) -> f64 {
        self.tracker.closed().progress(self.duration.seconds())
    }

    /// Freeze the media duration. Fails if already set or not strictly positive.
    pub fn set_duration(&mut self, length: f64) -> Result<(), XapiError> {
        self.duration = self.duration.freeze(length)?;
        Ok(())
    }

    // ─── Lifecycle ────────────────────────────────────────────────

    pub fn initialized(
        &mut self,
        length: f64,
        context: &ContextExtensions,
    ) -> Result<(), XapiError> {
        self.set_duration(length)?;
        let threshold = self.duration.threshold()?;
        self.started_at = Some(self.clock.now());

        let mut ext = self.base_context();
        ext.insert(extensions::LENGTH.into(), Value::from(self.duration.seconds()));
        ext.insert(extensions::COMPLETION_THRESHOLD.into(), Value::from(threshold));
        context.write_into(&mut ext);

        tracing::info!(
            session_id = %self.session_id,
            length = self.duration.seconds(),
            threshold,
            "video session initialized"
        );
        self.send(Statement::new(VerbKind::Initialized).with_context(ext));
        Ok(())
    }

    pub fn played(&mut self, time: f64) {
        let time = truncate_time(time);
        self.tracker = std::mem::take(&mut self.tracker).start(time);

        let result = StatementResult::default().with_extension(extensions::TIME, time);
        self.send(
            Statement::new(VerbKind::Played)
                .with_context(self.base_context())
                .with_result(result),
        );
    }

    /// Close the open interval and report progress; completes the session
    /// when progress crosses the threshold.
    pub fn paused(&mut self, time: f64) {
        let time = truncate_time(time);
        self.tracker = std::mem::take(&mut self.tracker).end(time);
        let progress = self.progress();

        let result = StatementResult::default()
            .with_extension(extensions::TIME, time)
            .with_extension(extensions::PLAYED_SEGMENTS, self.played_segments())
            .with_extension(extensions::PROGRESS, progress);
        self.send(
            Statement::new(VerbKind::Paused)
                .with_context(self.base_context())
                .with_result(result),
        );

        if let Ok(threshold) = self.duration.threshold() {
            if self.completion.crosses(progress, threshold) {
                self.completed(time);
            }
        }
    }

    pub fn seeked(&mut self, from: f64, to: f64) {
        let from = truncate_time(from);
        let to = truncate_time(to);
        self.tracker = std::mem::take(&mut self.tracker).seek(from, to);
        let progress = self.progress();

        let result = StatementResult::default()
            .with_extension(extensions::TIME_FROM, from)
            .with_extension(extensions::TIME_TO, to)
            .with_extension(extensions::PLAYED_SEGMENTS, self.played_segments())
            .with_extension(extensions::PROGRESS, progress);
        self.send(
            Statement::new(VerbKind::Seeked)
                .with_context(self.base_context())
                .with_result(result),
        );
    }

    /// Emit the one-shot completion statement. Ignored once completed, or
    /// before the duration is known.
    pub fn completed(&mut self, time: f64) {
        let Some(started_at) = self.started_at.filter(|_| self.duration.is_set()) else {
            tracing::debug!(session_id = %self.session_id, "completion ignored: not initialized");
            return;
        };
        let now = self.clock.now();
        let Some(next) = self.completion.complete(now) else {
            tracing::debug!(session_id = %self.session_id, "completion ignored: already completed");
            return;
        };
        self.completion = next;

        let time = truncate_time(time);
        let result = StatementResult {
            completion: Some(true),
            duration: Some(now.signed_duration_since(started_at).to_string()),
            ..StatementResult::default()
        }
        .with_extension(extensions::TIME, time)
        .with_extension(extensions::PROGRESS, 1)
        .with_extension(extensions::PLAYED_SEGMENTS, self.played_segments());

        tracing::info!(session_id = %self.session_id, time, "video completed");
        self.send(
            Statement::new(VerbKind::Completed)
                .with_context(self.base_context())
                .with_result(result),
        );
    }

    /// Close any open interval (through `paused`) and report the final state.
    pub fn terminated(&mut self, time: f64) {
        let time = truncate_time(time);
        if self.tracker.open().is_some() {
            self.paused(time);
        }
        let progress = self.progress();

        let result = StatementResult::default()
            .with_extension(extensions::TIME, time)
            .with_extension(extensions::PROGRESS, progress)
            .with_extension(extensions::PLAYED_SEGMENTS, self.played_segments());
        self.send(
            Statement::new(VerbKind::Terminated)
                .with_context(self.base_context())
                .with_result(result),
        );
    }

    /// Report a player setting change. Segments are untouched.
    pub fn interacted(&mut self, time: f64, context: &ContextExtensions) {
        let mut ext = self.base_context();
        context.write_into(&mut ext);

        let result =
            StatementResult::default().with_extension(extensions::TIME, truncate_time(time));
        self.send(
            Statement::new(VerbKind::Interacted)
                .with_context(ext)
                .with_result(result),
        );
    }

    pub fn downloaded(&mut self, quality: u32) {
        let mut ext = self.base_context();
        ext.insert(extensions::QUALITY.into(), Value::from(quality));
        self.send(Statement::new(VerbKind::Downloaded).with_context(ext));
    }

    // ─── Internal ─────────────────────────────────────────────────

    fn base_context(&self) -> Extensions {
        let mut ext = Extensions::new();
        ext.insert(
            extensions::SESSION_ID.into(),
            Value::from(self.session_id.as_str()),
        );
        ext
    }

    fn send(&self, statement: Statement) {
        let verb = statement.verb_kind().map_or("unknown", VerbKind::as_str);
        if !self.duration.is_set() {
            tracing::debug!(session_id = %self.session_id, verb, "statement dropped: duration not set");
            return;
        }
        let statement = statement.stamped(self.clock.now());
        tracing::debug!(session_id = %self.session_id, verb, "statement sent");
        self.transport.send(&statement);
    }
}

impl<T: Transport, C: Clock> StatementSession for VideoSession<T, C> {
    fn apply(&mut self, event: &PlayerEvent) -> Result<(), XapiError> {
        match event {
            PlayerEvent::Initialized { length, context } => {
                let length = length.ok_or_else(|| {
                    XapiError::InvalidEvent("initialized requires a media length".into())
                })?;
                self.initialized(length, context)?;
            }
            PlayerEvent::Played { time } => self.played(*time),
            PlayerEvent::Paused { time } => self.paused(*time),
            PlayerEvent::Seeked { from, to } => self.seeked(*from, *to),
            PlayerEvent::Completed { time } => self.completed(*time),
            PlayerEvent::Terminated { time } => self.terminated(*time),
            PlayerEvent::Interacted { time, context } => self.interacted(*time, context),
            PlayerEvent::Downloaded { quality } => self.downloaded(*quality),
        }
        Ok(())
    }

    fn played_segments(&self) -> String {
        VideoSession::played_segments(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn session() -> (VideoSession<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        (VideoSession::new("sess-1", transport.clone()), transport)
    }

    #[test]
    fn statements_dropped_before_initialized() {
        let (mut s, sent) = session();
        s.played(0.0);
        s.paused(5.0);
        s.interacted(5.0, &ContextExtensions::default());
        assert!(sent.is_empty());
        assert_eq!(s.duration(), 0.0);
    }

    #[test]
    fn threshold_unavailable_before_initialized() {
        let (s, _) = session();
        assert_eq!(s.completion_threshold(), Err(XapiError::ThresholdUnavailable));
    }

    #[test]
    fn initialized_twice_fails() {
        let (mut s, sent) = session();
        s.initialized(100.0, &ContextExtensions::default())
            .expect("first");
        let err = s
            .initialized(50.0, &ContextExtensions::default())
            .expect_err("second");
        assert!(err.to_string().contains("immutable"));
        assert_eq!(s.duration(), 100.0);
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn initialized_rejects_zero_length() {
        let (mut s, sent) = session();
        let err = s
            .initialized(0.0, &ContextExtensions::default())
            .expect_err("zero");
        assert!(err.to_string().contains("must be strictly positive"));
        assert!(sent.is_empty());
        assert!(s.started_at().is_none());
    }

    #[test]
    fn initialized_context() {
        let (mut s, sent) = session();
        let ctx = ContextExtensions {
            volume: Some(0.5),
            ..Default::default()
        };
        s.initialized(600.0, &ctx).expect("init");
        let stmt = &sent.statements()[0];
        assert_eq!(stmt.verb_kind(), Some(VerbKind::Initialized));
        assert_eq!(*stmt.context_extension(extensions::SESSION_ID).expect("sid"), "sess-1");
        assert_eq!(stmt.context_extension(extensions::LENGTH).expect("len"), 600.0);
        assert_eq!(
            stmt.context_extension(extensions::COMPLETION_THRESHOLD)
                .expect("threshold"),
            0.95
        );
        assert_eq!(stmt.context_extension(extensions::VOLUME).expect("vol"), 0.5);
        assert!(stmt.result.is_none());
        assert!(stmt.id.is_some());
        assert!(stmt.timestamp.is_some());
    }

    #[test]
    fn played_truncates_time() {
        let (mut s, sent) = session();
        s.initialized(100.0, &ContextExtensions::default())
            .expect("init");
        s.played(1.23456);
        let stmt = &sent.statements()[1];
        assert_eq!(stmt.result_extension(extensions::TIME).expect("time"), 1.234);
        assert_eq!(s.tracker().open(), Some(1.234));
    }

    #[test]
    fn nan_times_are_ignored_by_segment_tracking() {
        let (mut s, sent) = session();
        s.initialized(100.0, &ContextExtensions::default())
            .expect("init");
        for i in 0..40 {
            let t = if i % 3 == 0 { f64::NAN } else { f64::from(i) };
            s.played(t);
            s.paused(t + 0.5);
        }
        s.paused(50.0);
        let progress = s.progress();
        assert!((0.0..=1.0).contains(&progress));
        assert!(!s.played_segments().contains("NaN"));
        assert!(sent.len() > 1);
    }

    #[test]
    fn backward_pause_counts_nothing() {
        let (mut s, _) = session();
        s.initialized(100.0, &ContextExtensions::default())
            .expect("init");
        s.played(40.0);
        s.paused(10.0);
        assert_eq!(s.played_segments(), "40[.]10");
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn completed_requires_initialized() {
        let (mut s, sent) = session();
        s.completed(10.0);
        assert!(!s.is_completed());
        assert!(sent.is_empty());
    }

    #[test]
    fn explicit_completed_latches() {
        let (mut s, sent) = session();
        s.initialized(100.0, &ContextExtensions::default())
            .expect("init");
        s.completed(10.0);
        s.completed(20.0);
        let completed: Vec<_> = sent
            .statements()
            .into_iter()
            .filter(|st| st.verb_kind() == Some(VerbKind::Completed))
            .collect();
        assert_eq!(completed.len(), 1);
        assert!(s.is_completed());
    }

    #[test]
    fn downloaded_reports_quality() {
        let (mut s, sent) = session();
        s.initialized(100.0, &ContextExtensions::default())
            .expect("init");
        s.downloaded(720);
        let stmt = sent.statements().pop().expect("statement");
        assert_eq!(stmt.verb_kind(), Some(VerbKind::Downloaded));
        assert_eq!(stmt.context_extension(extensions::QUALITY).expect("q"), 720);
    }

    #[test]
    fn apply_requires_length_for_initialized() {
        let (mut s, _) = session();
        let err = s
            .apply(&PlayerEvent::Initialized {
                length: None,
                context: ContextExtensions::default(),
            })
            .expect_err("missing length");
        assert!(matches!(err, XapiError::InvalidEvent(_)));
    }
}
