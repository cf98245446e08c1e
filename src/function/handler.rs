//! Viewer function trait and error type.

use crate::http::ViewerRequest;

/// A request-stage edge function.
///
/// The edge runtime invokes `handle` once per inbound viewer request,
/// before cache and origin lookup, under unbounded parallelism. The
/// contract is deliberately narrow: same shape in, same shape out, no
/// suspension points, no I/O, no shared state. Implementations must be
/// total over every input URI; an ambiguous input is passed through
/// rather than rejected.
pub trait ViewerFunction: Send + Sync {
    /// Transform the viewer request before origin lookup.
    fn handle(&self, request: ViewerRequest) -> Result<ViewerRequest, FunctionError>;

    /// Get the function name.
    fn name(&self) -> &str;
}

/// Viewer function error type.
///
/// Exists only at the trait seam. A function that fails here does not fail
/// the request: the runtime logs and forwards the original request, so the
/// worst outcome of a bad rewrite is a 404 from the origin.
#[derive(Debug, Clone)]
pub struct FunctionError {
    /// Error message.
    pub message: String,
}

impl FunctionError {
    /// Create a new FunctionError.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FunctionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FunctionError {}
