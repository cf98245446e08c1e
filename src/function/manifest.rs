//! Function manifest metadata.
//!
//! The manifest describes how a function attaches to the distribution:
//! which event stage it runs at and the name it is deployed under. The
//! stack declaration embeds this when building the function association.

use serde::{Deserialize, Serialize};

/// Distribution event stage a function can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Runs before cache and origin lookup, once per viewer request.
    #[serde(rename = "viewer-request")]
    ViewerRequest,
    /// Runs after the response is produced, before it returns to the viewer.
    #[serde(rename = "viewer-response")]
    ViewerResponse,
}

impl Stage {
    /// The event-type string the provisioning template uses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ViewerRequest => "viewer-request",
            Stage::ViewerResponse => "viewer-response",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for a deployed edge function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionManifest {
    /// Deployed function name.
    pub name: String,
    /// Event stage the function attaches to.
    pub stage: Stage,
    /// Optional description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl FunctionManifest {
    /// Create a new function manifest.
    pub fn new(name: impl Into<String>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage,
            comment: String::new(),
        }
    }

    /// Set the description.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}
