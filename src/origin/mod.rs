//! The origin contract: object keys and a local directory origin.
//!
//! Deployment uploads the site directory verbatim, so an object key is
//! exactly a file path relative to the site root. `ObjectKey` owns both
//! derivations (from a rewritten URI, from a file on disk) and the two
//! must agree for a request to resolve.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A storage object key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Derive the key a URI resolves to: the path with its leading `/`
    /// stripped. The URI is expected to have been through the rewrite
    /// function already, so it names a concrete file.
    pub fn from_uri(uri: &str) -> Self {
        Self(uri.trim_start_matches('/').to_string())
    }

    /// Derive the key a file uploads under: its path relative to the site
    /// root, with `/` separators regardless of platform. Returns `None`
    /// for paths outside the root.
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(Self(key))
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is empty (the URI was bare `/` before rewriting).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys with `.` or `..` segments never match an uploaded object, and
    /// letting them through would let the local origin escape its root.
    pub fn is_traversal(&self) -> bool {
        self.0.split('/').any(|segment| segment == ".." || segment == ".")
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// An object fetched from the origin.
#[derive(Debug, Clone)]
pub struct StaticObject {
    /// Object bytes.
    pub body: Bytes,
    /// Content type inferred from the key's extension.
    pub content_type: &'static str,
}

/// A local directory standing in for the storage bucket.
///
/// `get` is the origin lookup the CDN performs on a cache miss; `walk` is
/// the upload manifest the deployment step would push.
#[derive(Debug, Clone)]
pub struct DirOrigin {
    root: PathBuf,
}

impl DirOrigin {
    /// Create an origin rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The site root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fetch an object by key. `Ok(None)` means the key names nothing,
    /// which surfaces as a 404 downstream.
    pub fn get(&self, key: &ObjectKey) -> io::Result<Option<StaticObject>> {
        if key.is_empty() || key.is_traversal() {
            return Ok(None);
        }
        let path = self.root.join(key.as_str());
        if !path.is_file() {
            return Ok(None);
        }
        let body = Bytes::from(fs::read(&path)?);
        Ok(Some(StaticObject {
            body,
            content_type: content_type_for(key.as_str()),
        }))
    }

    /// Enumerate every file under the root as `(key, path)` pairs, the
    /// verbatim-upload manifest. Keys come back sorted.
    pub fn walk(&self) -> io::Result<Vec<(ObjectKey, PathBuf)>> {
        let mut manifest = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Some(key) = ObjectKey::from_path(&self.root, &path) {
                    manifest.push((key, path));
                }
            }
        }
        manifest.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(manifest)
    }
}

/// Content type for an object key, by extension.
pub fn content_type_for(key: &str) -> &'static str {
    let extension = key.rsplit('.').next().unwrap_or_default();
    match extension {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "woff2" => "font/woff2",
        "woff" => "font/woff",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}
