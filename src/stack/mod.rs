//! Provisioning declarations for the static-website stack.
//!
//! Everything here runs once at synthesis time. The output is a template
//! document for the external provisioning engine; no provider API is ever
//! called from this crate.

pub mod params;
pub mod resources;
pub mod template;

pub use params::{DeployParams, EnvStore, MemoryStore, ParameterStore};
pub use resources::{DeletionPolicy, RecordType, Resource};
pub use template::{StaticSiteStack, Template};

/// Error type for synthesis-time failures.
#[derive(Debug)]
pub enum StackError {
    /// A deploy parameter was not set in the configuration store.
    MissingParameter(String),
    /// A logical id was declared twice.
    DuplicateLogicalId(String),
    /// The parameter store backend failed.
    Store(String),
    /// The template could not be rendered.
    Render(serde_json::Error),
}

impl std::fmt::Display for StackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackError::MissingParameter(name) => {
                write!(f, "missing deploy parameter: {name}")
            }
            StackError::DuplicateLogicalId(id) => {
                write!(f, "duplicate logical id: {id}")
            }
            StackError::Store(message) => write!(f, "parameter store error: {message}"),
            StackError::Render(err) => write!(f, "template render error: {err}"),
        }
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StackError::Render(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Render(err)
    }
}
