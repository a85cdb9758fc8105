//! `xapi-video replay`: feed a JSON-lines player event log through a session.
//!
//! One event per line; blank lines and lines starting with `#` are skipped.
//! Statements go to the configured endpoint, or to stdout with `--dry-run`
//! or when no endpoint is configured.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use xapi_video_core::{LiveSession, PlayerEvent, StatementSession, Transport, VideoSession};
use xapi_video_transport::{HttpTransport, StdoutTransport, TransportConfig};

use crate::cli::ReplayOpts;

pub async fn cmd_replay(opts: ReplayOpts) -> anyhow::Result<()> {
    let session_id = opts
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let (transport, remote) = build_transport(&opts)?;

    let mut session: Box<dyn StatementSession> = if opts.live {
        Box::new(LiveSession::new(session_id.clone(), transport))
    } else {
        Box::new(VideoSession::new(session_id.clone(), transport))
    };

    let input = read_input(&opts.input)?;
    let applied = replay_events(session.as_mut(), &input)?;
    tracing::info!(
        session_id = %session_id,
        events = applied,
        played_segments = %session.played_segments(),
        "replay finished"
    );

    if remote {
        // Deliveries run detached; give them a moment before the runtime shuts down.
        tokio::time::sleep(Duration::from_millis(opts.linger_ms)).await;
    }
    Ok(())
}

fn build_transport(opts: &ReplayOpts) -> anyhow::Result<(Box<dyn Transport>, bool)> {
    match (&opts.endpoint, opts.dry_run) {
        (Some(endpoint), false) => {
            let transport = HttpTransport::new(TransportConfig {
                endpoint: endpoint.clone(),
                credential: opts.token.clone(),
            })?;
            tracing::info!(endpoint = %transport.endpoint(), "sending statements over http");
            Ok((Box::new(transport), true))
        }
        _ => Ok((Box::new(StdoutTransport), false)),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read events from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read events from {}", path.display()))
}

/// Apply every event in `input`. Returns the number of events applied.
pub(crate) fn replay_events(
    session: &mut dyn StatementSession,
    input: &str,
) -> anyhow::Result<usize> {
    let mut applied = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_num = idx + 1;
        let event: PlayerEvent = line
            .parse()
            .with_context(|| format!("line {line_num}: cannot parse player event"))?;
        session
            .apply(&event)
            .with_context(|| format!("line {line_num}: {} rejected", event.name()))?;
        applied += 1;
    }
    Ok(applied)
}
