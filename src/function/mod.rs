//! Edge functions: the viewer-request seam and the URL rewrite core.

pub mod handler;
pub mod manifest;
pub mod registry;
pub mod rewrite;

pub use handler::{FunctionError, ViewerFunction};
pub use manifest::{FunctionManifest, Stage};
pub use registry::FunctionRegistry;
pub use rewrite::{rewrite_uri, RewriteUrl, DEFAULT_DOCUMENT, REWRITE_URL_NAME};
