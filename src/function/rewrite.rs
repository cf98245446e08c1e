//! URL rewriting for a static-file origin.
//!
//! A static origin serves literal object keys, so "pretty" routes like
//! `/about` or `/blog/post/` have to be mapped onto the `index.html`
//! objects the site layout actually contains. This module is that mapping:
//! the only custom logic in the whole stack that runs per request.

use crate::function::handler::{FunctionError, ViewerFunction};
use crate::http::ViewerRequest;

/// Default document appended to directory-style URIs.
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Rewrite a viewer URI onto the object key layout of the static origin.
///
/// The convention here is directory-style: extensionless paths resolve to
/// `<path>/index.html`, so every page lives at `dir/index.html` in the
/// site tree.
///
/// - empty or `/` → `/index.html`
/// - trailing `/` → append `index.html`
/// - last segment has an extension (`/style.css`) → unchanged
/// - otherwise (`/blog/2024/post`) → append `/index.html`
///
/// Pure and total: no I/O, no logging, no failure path. Applying it to an
/// already-rewritten URI is a no-op, since the appended document name
/// carries an extension.
pub fn rewrite_uri(uri: &str) -> String {
    if uri.is_empty() {
        return format!("/{DEFAULT_DOCUMENT}");
    }
    if uri.ends_with('/') {
        return format!("{uri}{DEFAULT_DOCUMENT}");
    }
    let last_segment = match uri.rfind('/') {
        Some(i) => &uri[i + 1..],
        None => uri,
    };
    if last_segment.contains('.') {
        uri.to_string()
    } else {
        format!("{uri}/{DEFAULT_DOCUMENT}")
    }
}

/// The `rewrite-url` viewer function the distribution associates at the
/// viewer-request stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteUrl;

/// Name the function is deployed and registered under.
pub const REWRITE_URL_NAME: &str = "rewrite-url";

impl ViewerFunction for RewriteUrl {
    fn handle(&self, request: ViewerRequest) -> Result<ViewerRequest, FunctionError> {
        let uri = rewrite_uri(&request.uri);
        Ok(request.with_uri(uri))
    }

    fn name(&self) -> &str {
        REWRITE_URL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_gets_default_document() {
        assert_eq!(rewrite_uri("/"), "/index.html");
    }

    #[test]
    fn test_empty_uri_is_normalized() {
        assert_eq!(rewrite_uri(""), "/index.html");
    }

    #[test]
    fn test_trailing_slash_appends_document() {
        assert_eq!(rewrite_uri("/about/"), "/about/index.html");
        assert_eq!(rewrite_uri("/blog/2024/"), "/blog/2024/index.html");
    }

    #[test]
    fn test_extensionless_path_resolves_directory_style() {
        assert_eq!(rewrite_uri("/about"), "/about/index.html");
        assert_eq!(rewrite_uri("/blog/2024/post"), "/blog/2024/post/index.html");
    }

    #[test]
    fn test_concrete_files_pass_through() {
        assert_eq!(rewrite_uri("/style.css"), "/style.css");
        assert_eq!(rewrite_uri("/assets/app.js"), "/assets/app.js");
        assert_eq!(rewrite_uri("/favicon.ico"), "/favicon.ico");
    }

    #[test]
    fn test_dot_in_directory_name_only() {
        // The extension check looks at the last segment, not the whole path.
        assert_eq!(rewrite_uri("/v1.2/docs"), "/v1.2/docs/index.html");
        assert_eq!(rewrite_uri("/v1.2/"), "/v1.2/index.html");
    }

    #[test]
    fn test_trailing_dot_counts_as_extension() {
        assert_eq!(rewrite_uri("/weird."), "/weird.");
    }

    #[test]
    fn test_already_rewritten_uri_is_stable() {
        let once = rewrite_uri("/about");
        let twice = rewrite_uri(&once);
        assert_eq!(once, "/about/index.html");
        assert_eq!(twice, once);
    }

    #[test]
    fn test_function_rewrites_only_the_uri() {
        let request = ViewerRequest::get("/about").query("ref=nav");
        let out = RewriteUrl.handle(request).unwrap();
        assert_eq!(out.uri, "/about/index.html");
        assert_eq!(out.querystring, "ref=nav");
    }

    #[test]
    fn test_function_never_fails() {
        for uri in ["", "/", "//", "/..", "/a//b", "/%20", "no-leading-slash"] {
            assert!(RewriteUrl.handle(ViewerRequest::get(uri)).is_ok());
        }
    }
}
