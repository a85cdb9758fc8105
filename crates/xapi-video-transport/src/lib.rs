//! xapi-video-transport: statement delivery IO boundary.
//! HTTP POST to a record-store endpoint, or JSON lines on stdout.
//! No retries, no response handling: delivery is best-effort.

pub mod error;
pub mod http;
pub mod stdout;

pub use error::TransportError;
pub use http::{HttpTransport, TransportConfig};
pub use stdout::StdoutTransport;
