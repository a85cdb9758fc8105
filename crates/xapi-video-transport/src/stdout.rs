//! JSON-lines transport on stdout, for dry runs and piping.

use std::io::Write;

use xapi_video_core::{Statement, Transport};

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutTransport;

impl Transport for StdoutTransport {
    fn send(&self, statement: &Statement) {
        match serde_json::to_string(statement) {
            Ok(line) => {
                let mut out = std::io::stdout().lock();
                if let Err(e) = writeln!(out, "{line}") {
                    tracing::debug!(error = %e, "stdout write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "statement serialization failed"),
        }
    }
}
