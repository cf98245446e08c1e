//! Local runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the local origin runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the static site, uploaded verbatim on deploy.
    pub site_root: PathBuf,
    /// Object served for the bare root request, mirroring the
    /// distribution's default root object.
    pub default_root_object: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            site_root: PathBuf::from("public"),
            default_root_object: "index.html".to_string(),
        }
    }
}

impl SiteConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `SITEFRONT_HOST`, `SITEFRONT_PORT`, and
    /// `SITEFRONT_SITE_ROOT` where set. An unparsable port falls back to
    /// the default rather than failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("SITEFRONT_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("SITEFRONT_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(root) = std::env::var("SITEFRONT_SITE_ROOT") {
            config.site_root = PathBuf::from(root);
        }
        config
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the site root directory.
    pub fn site_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.site_root = root.into();
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
