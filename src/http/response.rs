//! Origin response type returned by the local runtime.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Check if the status code indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Check if the status code indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

/// Response the local origin runtime sends back to the viewer.
///
/// In production this shape is owned by the CDN; the local runtime builds
/// it from the origin lookup so the edge behavior is observable end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// HTTP headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Bytes>,
}

impl OriginResponse {
    /// Create a new response with the given status code.
    pub fn new(status: impl Into<StatusCode>) -> Self {
        Self {
            status: status.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// An object served from the origin with its content type.
    pub fn object(body: impl Into<Bytes>, content_type: &str) -> Self {
        Self::new(StatusCode::OK)
            .header("Content-Type", content_type)
            .body(body)
    }

    /// Create a response with JSON body.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(data)?;
        Ok(Self::new(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(body))
    }

    /// Create a plain-text response.
    pub fn text(status: impl Into<StatusCode>, content: impl Into<String>) -> Self {
        Self::new(status)
            .header("Content-Type", "text/plain")
            .body(content.into())
    }

    /// Add a header to the response.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl Default for OriginResponse {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}
