//! HTTP transport: one POST per statement, spawned onto a tokio runtime.
//!
//! `send` returns immediately. The spawned request is never awaited by the
//! session; its outcome is only logged.

use std::fmt;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Request, Url};
use tokio::runtime::Handle;
use xapi_video_core::{Statement, Transport};

use crate::error::TransportError;

/// Record-store endpoint and bearer credential.
#[derive(Clone)]
pub struct TransportConfig {
    pub endpoint: String,
    pub credential: String,
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("endpoint", &self.endpoint)
            .field("credential", &"<redacted>")
            .finish()
    }
}

pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    credential: String,
    runtime: Handle,
}

impl HttpTransport {
    /// Build on the tokio runtime of the calling context.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        Self::with_handle(config, runtime)
    }

    pub fn with_handle(config: TransportConfig, runtime: Handle) -> Result<Self, TransportError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|e| TransportError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                detail: e.to_string(),
            })?;
        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
            credential: config.credential,
            runtime,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST request carrying `statement` as JSON with bearer authorization.
    pub fn build_request(&self, statement: &Statement) -> Result<Request, reqwest::Error> {
        self.client
            .post(self.endpoint.clone())
            .bearer_auth(&self.credential)
            .header(CONTENT_TYPE, "application/json")
            .json(statement)
            .build()
    }
}

impl Transport for HttpTransport {
    fn send(&self, statement: &Statement) {
        let request = match self.build_request(statement) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build statement request");
                return;
            }
        };
        let client = self.client.clone();
        self.runtime.spawn(async move {
            match client.execute(request).await {
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "statement delivered");
                }
                Err(e) => tracing::debug!(error = %e, "statement delivery failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use xapi_video_core::VerbKind;

    fn config(endpoint: &str) -> TransportConfig {
        TransportConfig {
            endpoint: endpoint.to_string(),
            credential: "secret-token".to_string(),
        }
    }

    #[test]
    fn new_requires_runtime() {
        let err = HttpTransport::new(config("http://localhost/xapi/")).err();
        assert!(matches!(err, Some(TransportError::NoRuntime)));
    }

    #[test]
    fn debug_redacts_credential() {
        let rendered = format!("{:?}", config("http://localhost/"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("redacted"));
    }

    #[tokio::test]
    async fn rejects_invalid_endpoint() {
        let err = HttpTransport::new(config("not a url")).err();
        assert!(matches!(err, Some(TransportError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn request_has_auth_and_json_body() {
        let transport = HttpTransport::new(config("http://localhost/xapi/video/")).expect("transport");
        let statement = Statement::new(VerbKind::Played);
        let request = transport.build_request(&statement).expect("request");

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost/xapi/video/");
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Bearer secret-token"
        );
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");

        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .expect("buffered body");
        let json: serde_json::Value = serde_json::from_slice(body).expect("json body");
        assert_eq!(json["verb"]["id"], VerbKind::Played.iri());
    }

    #[tokio::test]
    async fn send_posts_in_background() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let transport =
            HttpTransport::new(config(&format!("http://{addr}/statements"))).expect("transport");

        transport.send(&Statement::new(VerbKind::Paused));

        let (mut socket, _) = tokio::time::timeout(Duration::from_secs(5), listener.accept())
            .await
            .expect("request within timeout")
            .expect("accept");

        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = tokio::time::timeout(Duration::from_secs(5), socket.read(&mut buf))
                .await
                .expect("read within timeout")
                .expect("read");
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if n == 0 || (text.contains("\r\n\r\n") && text.ends_with('}')) {
                break;
            }
        }
        socket
            .write_all(b"HTTP/1.1 204 No Content\r\ncontent-length: 0\r\n\r\n")
            .await
            .expect("respond");

        let text = String::from_utf8_lossy(&raw).to_lowercase();
        assert!(text.starts_with("post /statements http/1.1"));
        assert!(text.contains("authorization: bearer secret-token"));
        assert!(text.contains("content-type: application/json"));
        assert!(text.contains("https://w3id.org/xapi/video/verbs/paused"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_silent() {
        let transport =
            HttpTransport::new(config("http://127.0.0.1:9/statements")).expect("transport");
        transport.send(&Statement::new(VerbKind::Terminated));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
