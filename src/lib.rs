//! # sitefront - static-website edge stack
//!
//! sitefront declares the infrastructure for a CDN-fronted static website
//! and implements the one piece of it that runs per request: the URL
//! rewrite function executed at the viewer-request stage, which maps
//! "pretty" routes onto the index documents a static-file origin can
//! actually serve.
//!
//! ## Architecture
//!
//! ```text
//! viewer ──▶ CDN edge ──▶ [rewrite-url function] ──▶ cache ──▶ bucket
//!                               │                              origin
//!            /about  ───────────┴──▶  /about/index.html
//!
//! synth time:  parameter store ──▶ StaticSiteStack ──▶ template JSON
//!                                                      (provisioning
//!                                                       engine's input)
//! ```
//!
//! The same rewrite function drives a local runtime that pairs the
//! viewer-request hook with a directory origin, so edge behavior is
//! testable end to end without a deployment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sitefront::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = SiteConfig::new().port(8080).site_root("public");
//!     let server = SiteServer::new(config)
//!         .with_viewer_request_function(Arc::new(RewriteUrl))?;
//!     server.run().await
//! }
//! ```
//!
//! ## Rewrite convention
//!
//! Extensionless paths resolve directory-style: `/about` becomes
//! `/about/index.html`, so the site layout places every page at
//! `dir/index.html`. URIs whose last segment carries an extension pass
//! through untouched.

pub mod function;
pub mod http;
pub mod origin;
pub mod runtime;
pub mod stack;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::function::{
        rewrite_uri, FunctionManifest, FunctionRegistry, RewriteUrl, Stage, ViewerFunction,
    };
    pub use crate::function::handler::FunctionError;
    pub use crate::http::{Method, OriginResponse, StatusCode, ViewerRequest};
    pub use crate::origin::{DirOrigin, ObjectKey};
    pub use crate::runtime::{SiteConfig, SiteServer};
    pub use crate::stack::{DeployParams, EnvStore, ParameterStore, StaticSiteStack};
}

// Re-export for convenience
pub use function::{rewrite_uri, FunctionRegistry, RewriteUrl, ViewerFunction};
pub use http::{OriginResponse, ViewerRequest};
pub use origin::{DirOrigin, ObjectKey};
pub use runtime::{SiteConfig, SiteServer};
pub use stack::{DeployParams, StaticSiteStack};
