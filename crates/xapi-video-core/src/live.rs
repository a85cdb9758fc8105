//! Statement session for live (unbounded) streams.
//!
//! Tracks played segments like [`VideoSession`](crate::VideoSession) but has
//! no duration, so no progress and no completion. `seeked`, `completed` and
//! `downloaded` do nothing. Statements carry neither id nor timestamp.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::XapiError;
use crate::event::{PlayerEvent, StatementSession};
use crate::segments::SegmentTracker;
use crate::statement::{
    ContextExtensions, Extensions, Statement, StatementResult, VerbKind, extensions,
};
use crate::time::{Clock, SystemClock, truncate_time};
use crate::transport::Transport;

pub struct LiveSession<T, C = SystemClock> {
    session_id: String,
    transport: T,
    clock: C,
    tracker: SegmentTracker,
    started_at: Option<DateTime<Utc>>,
}

impl<T: Transport> LiveSession<T, SystemClock> {
    pub fn new(session_id: impl Into<String>, transport: T) -> Self {
        Self::with_clock(session_id, transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> LiveSession<T, C> {
    pub fn with_clock(session_id: impl Into<String>, transport: T, clock: C) -> Self {
        Self {
            session_id: session_id.into(),
            transport,
            clock,
            tracker: SegmentTracker::new(),
            started_at: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn tracker(&self) -> &SegmentTracker {
        &self.tracker
    }

    pub fn played_segments(&self) -> String {
        self.tracker.played_segments()
    }

    pub fn initialized(&mut self, context: &ContextExtensions) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
        let mut ext = self.base_context();
        context.write_into(&mut ext);
        self.send(Statement::new(VerbKind::Initialized).with_context(ext));
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

    pub fn paused(&mut self, time: f64) {
        let time = truncate_time(time);
        self.tracker = std::mem::take(&mut self.tracker).end(time);

        let result = StatementResult::default()
            .with_extension(extensions::TIME, time)
            .with_extension(extensions::PLAYED_SEGMENTS, self.played_segments());
        self.send(
            Statement::new(VerbKind::Paused)
                .with_context(self.base_context())
                .with_result(result),
        );
    }

    pub fn terminated(&mut self, time: f64) {
        let time = truncate_time(time);
        if self.tracker.open().is_some() {
            self.paused(time);
        }

        let result = StatementResult::default()
            .with_extension(extensions::TIME, time)
            .with_extension(extensions::PLAYED_SEGMENTS, self.played_segments());
        self.send(
            Statement::new(VerbKind::Terminated)
                .with_context(self.base_context())
                .with_result(result),
        );
    }

    /// Player setting change. Context only; live statements carry no result here.
    /// Nothing is sent when no setting is reported.
    pub fn interacted(&mut self, context: &ContextExtensions) {
        if context.is_empty() {
            tracing::debug!(session_id = %self.session_id, "live interaction without context ignored");
            return;
        }
        let mut ext = self.base_context();
        context.write_into(&mut ext);
        self.send(Statement::new(VerbKind::Interacted).with_context(ext));
    }

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
        if self.started_at.is_none() {
            tracing::debug!(session_id = %self.session_id, verb, "live statement dropped: not initialized");
            return;
        }
        tracing::debug!(session_id = %self.session_id, verb, "live statement sent");
        self.transport.send(&statement);
    }
}

impl<T: Transport, C: Clock> StatementSession for LiveSession<T, C> {
    fn apply(&mut self, event: &PlayerEvent) -> Result<(), XapiError> {
        match event {
            PlayerEvent::Initialized { context, .. } => self.initialized(context),
            PlayerEvent::Played { time } => self.played(*time),
            PlayerEvent::Paused { time } => self.paused(*time),
            PlayerEvent::Terminated { time } => self.terminated(*time),
            PlayerEvent::Interacted { context, .. } => self.interacted(context),
            PlayerEvent::Seeked { .. }
            | PlayerEvent::Completed { .. }
            | PlayerEvent::Downloaded { .. } => {
                tracing::debug!(event = event.name(), "ignored for live session");
            }
        }
        Ok(())
    }

    fn played_segments(&self) -> String {
        LiveSession::played_segments(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn session() -> (LiveSession<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        (LiveSession::new("live-1", transport.clone()), transport)
    }

    #[test]
    fn dropped_before_initialized() {
        let (mut s, sent) = session();
        s.played(1.0);
        s.paused(2.0);
        assert!(sent.is_empty());
        assert_eq!(s.played_segments(), "1[.]2");
    }

    #[test]
    fn paused_reports_segments_without_progress() {
        let (mut s, sent) = session();
        s.initialized(&ContextExtensions::default());
        s.played(0.0);
        s.paused(30.5);
        let stmt = sent.statements().pop().expect("paused");
        assert_eq!(stmt.verb_kind(), Some(VerbKind::Paused));
        assert_eq!(
            *stmt.result_extension(extensions::PLAYED_SEGMENTS).expect("segments"),
            "0[.]30.5"
        );
        assert!(stmt.result_extension(extensions::PROGRESS).is_none());
        assert!(stmt.id.is_none());
        assert!(stmt.timestamp.is_none());
    }

    #[test]
    fn seek_complete_download_are_noops() {
        let (mut s, sent) = session();
        s.initialized(&ContextExtensions::default());
        s.played(0.0);
        let before = sent.len();
        for event in [
            PlayerEvent::Seeked { from: 5.0, to: 50.0 },
            PlayerEvent::Completed { time: 60.0 },
            PlayerEvent::Downloaded { quality: 480 },
        ] {
            s.apply(&event).expect("apply");
        }
        assert_eq!(sent.len(), before);
        assert_eq!(s.tracker().open(), Some(0.0));
    }

    #[test]
    fn interacted_has_context_only() {
        let (mut s, sent) = session();
        s.initialized(&ContextExtensions::default());
        s.interacted(&ContextExtensions {
            speed: Some("2x".into()),
            ..Default::default()
        });
        let stmt = sent.statements().pop().expect("interacted");
        assert!(stmt.result.is_none());
        assert_eq!(*stmt.context_extension(extensions::SPEED).expect("speed"), "2x");
        assert_eq!(
            *stmt.context_extension(extensions::SESSION_ID).expect("sid"),
            "live-1"
        );
    }

    #[test]
    fn interacted_without_context_is_not_sent() {
        let (mut s, sent) = session();
        s.initialized(&ContextExtensions::default());
        let before = sent.len();
        s.apply(&PlayerEvent::Interacted {
            time: 3.0,
            context: ContextExtensions::default(),
        })
        .expect("apply");
        assert_eq!(sent.len(), before);
    }

    #[test]
    fn terminated_closes_open_interval() {
        let (mut s, sent) = session();
        s.initialized(&ContextExtensions::default());
        s.played(10.0);
        s.terminated(25.0);
        let verbs: Vec<_> = sent
            .statements()
            .iter()
            .filter_map(Statement::verb_kind)
            .collect();
        assert_eq!(
            verbs,
            vec![
                VerbKind::Initialized,
                VerbKind::Played,
                VerbKind::Paused,
                VerbKind::Terminated
            ]
        );
        assert_eq!(s.played_segments(), "10[.]25");
    }
}
