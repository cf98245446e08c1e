//! Viewer request type, the event record handed to edge functions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP method enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
}

impl Method {
    /// The distribution forwards only GET and HEAD to the origin.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Head => write!(f, "HEAD"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Options => write!(f, "OPTIONS"),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Method::Get,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::POST => Method::Post,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::OPTIONS => Method::Options,
            _ => Method::Get,
        }
    }
}

/// The request record a viewer function receives, one per invocation.
///
/// Mirrors the event shape the CDN edge runtime hands to request-stage
/// functions: a URI path, the raw query string, and the viewer headers.
/// Functions return the same shape with the URI possibly rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerRequest {
    /// HTTP method.
    pub method: Method,
    /// URL path (no scheme, host, or query).
    pub uri: String,
    /// Raw query string, without the leading `?`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub querystring: String,
    /// Viewer headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ViewerRequest {
    /// Create a new viewer request for the given path.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            querystring: String::new(),
            headers: HashMap::new(),
        }
    }

    /// Shorthand for a GET request, the common case at the edge.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the query string.
    pub fn query(mut self, querystring: impl Into<String>) -> Self {
        self.querystring = querystring.into();
        self
    }

    /// Get a header value.
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }

    /// Return the same request with a different URI. Everything else is
    /// carried through untouched, which is the whole contract of a
    /// request-stage rewrite.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }
}

impl Default for ViewerRequest {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}
