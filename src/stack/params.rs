//! Deploy parameters and the configuration store they resolve from.
//!
//! The provisioning declarations need three values that live outside the
//! repository: the DNS record name, the hosted zone's base domain, and the
//! TLS certificate identifier. They are resolved from a parameter store at
//! synthesis time and passed in explicitly; nothing downstream reads them
//! ambiently, and the rewrite function never sees them at all.

use crate::stack::StackError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Parameter path for the DNS record name (e.g. `www.example.com`).
pub const RECORD_NAME_PARAM: &str = "/static-website/record-name";
/// Parameter path for the hosted zone's base domain (e.g. `example.com`).
pub const DOMAIN_NAME_PARAM: &str = "/static-website/domain-name";
/// Parameter path for the TLS certificate identifier.
pub const CERTIFICATE_ARN_PARAM: &str = "/static-website/certificate-arn";

/// The resolved deploy-time parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployParams {
    /// Public hostname the distribution answers for.
    pub record_name: String,
    /// Base domain whose hosted zone receives the alias records.
    pub domain_name: String,
    /// Certificate bound to the distribution.
    pub certificate_arn: String,
}

impl DeployParams {
    /// Resolve all three parameters from a store. Any missing parameter is
    /// an error at synthesis time, not at request time.
    pub async fn resolve(store: &dyn ParameterStore) -> Result<Self, StackError> {
        Ok(Self {
            record_name: require(store, RECORD_NAME_PARAM).await?,
            domain_name: require(store, DOMAIN_NAME_PARAM).await?,
            certificate_arn: require(store, CERTIFICATE_ARN_PARAM).await?,
        })
    }
}

async fn require(store: &dyn ParameterStore, name: &str) -> Result<String, StackError> {
    store
        .get(name)
        .await?
        .ok_or_else(|| StackError::MissingParameter(name.to_string()))
}

/// Trait for external key-value configuration stores.
///
/// This is the boundary to whatever holds deployment configuration; the
/// lookup is async because real backends sit across the network.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Look up a parameter by its path. `Ok(None)` means not set.
    async fn get(&self, name: &str) -> Result<Option<String>, StackError>;
}

/// In-memory parameter store for tests and local synthesis.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter value.
    pub async fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.write().await;
        entries.insert(name.into(), value.into());
    }
}

#[async_trait]
impl ParameterStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StackError> {
        let entries = self.entries.read().await;
        Ok(entries.get(name).cloned())
    }
}

/// Parameter store backed by process environment variables.
///
/// `/static-website/record-name` maps to `SITEFRONT_RECORD_NAME`, and so
/// on: last path segment, uppercased, dashes to underscores.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvStore;

impl EnvStore {
    /// Create an environment-backed store.
    pub fn new() -> Self {
        Self
    }

    fn var_name(name: &str) -> String {
        let segment = name.rsplit('/').next().unwrap_or(name);
        format!("SITEFRONT_{}", segment.to_uppercase().replace('-', "_"))
    }
}

#[async_trait]
impl ParameterStore for EnvStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StackError> {
        Ok(std::env::var(Self::var_name(name)).ok())
    }
}
