//! xapi-video-core: statement and segment-tracking engine for xAPI video sessions.
//!
//! Records which ranges of a video were watched, derives a completion
//! progress ratio, and assembles one xAPI statement per player lifecycle
//! event. Pure and synchronous: delivery is delegated to an injected
//! [`Transport`], wall-clock time to an injected [`Clock`].

pub mod completion;
pub mod error;
pub mod event;
pub mod live;
pub mod segments;
pub mod session;
pub mod statement;
pub mod time;
pub mod transport;

pub use completion::{CompletionState, MediaDuration, completion_threshold};
pub use error::XapiError;
pub use event::{PlayerEvent, StatementSession};
pub use live::LiveSession;
pub use segments::{PlayedSegments, Segment, SegmentTracker, encode_merged, progress};
pub use session::VideoSession;
pub use statement::{
    ContextExtensions, Extensions, Statement, StatementContext, StatementResult, Verb, VerbKind,
    extensions,
};
pub use time::{Clock, SystemClock, truncate_time};
pub use transport::{MemoryTransport, Transport};
