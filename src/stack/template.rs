//! Template assembly and synthesis.

use crate::function::manifest::{FunctionManifest, Stage};
use crate::function::rewrite::REWRITE_URL_NAME;
use crate::stack::params::{DeployParams, ParameterStore};
use crate::stack::resources::{
    self, RecordType, Resource, REWRITE_URL_CODE,
};
use crate::stack::StackError;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A provisioning template: resources plus exported outputs.
///
/// Synthesis is the end of this crate's responsibility; the emitted
/// document goes to the external provisioning engine, which owns diffing,
/// ordering, and the provider API conversation.
#[derive(Debug, Default)]
pub struct Template {
    resources: Vec<Resource>,
    outputs: BTreeMap<String, Value>,
}

impl Template {
    /// Create an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource. Logical ids must be unique.
    pub fn add(&mut self, resource: Resource) -> Result<(), StackError> {
        if self
            .resources
            .iter()
            .any(|r| r.logical_id == resource.logical_id)
        {
            return Err(StackError::DuplicateLogicalId(resource.logical_id));
        }
        self.resources.push(resource);
        Ok(())
    }

    /// Export a value under an output name.
    pub fn output(&mut self, name: impl Into<String>, value: Value) {
        self.outputs.insert(name.into(), json!({ "Value": value }));
    }

    /// Resources in declaration order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Render the template document.
    pub fn to_value(&self) -> Value {
        let mut resources = serde_json::Map::new();
        for resource in &self.resources {
            let mut entry = json!({
                "Type": resource.kind,
                "Properties": resource.properties,
            });
            if let Some(policy) = resource.deletion_policy {
                entry["DeletionPolicy"] = json!(policy.as_str());
            }
            resources.insert(resource.logical_id.clone(), entry);
        }
        let mut document = json!({ "Resources": Value::Object(resources) });
        if !self.outputs.is_empty() {
            document["Outputs"] = json!(self.outputs);
        }
        document
    }

    /// Render the template as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

/// The static-website stack: bucket, access identity, policy, edge
/// function, distribution, and the two alias records.
#[derive(Debug, Clone)]
pub struct StaticSiteStack {
    params: DeployParams,
}

impl StaticSiteStack {
    /// Create a stack from resolved deploy parameters.
    pub fn new(params: DeployParams) -> Self {
        Self { params }
    }

    /// Resolve parameters from a store, then build the stack.
    pub async fn from_store(store: &dyn ParameterStore) -> Result<Self, StackError> {
        Ok(Self::new(DeployParams::resolve(store).await?))
    }

    /// The deploy parameters this stack was built from.
    pub fn params(&self) -> &DeployParams {
        &self.params
    }

    /// Declare every resource into a template.
    pub fn template(&self) -> Result<Template, StackError> {
        let mut template = Template::new();

        template.add(resources::site_bucket("SiteBucket"))?;
        template.add(resources::origin_access_identity("OriginAccessIdentity"))?;
        template.add(resources::bucket_policy(
            "BucketPolicy",
            "SiteBucket",
            "OriginAccessIdentity",
        ))?;

        let manifest = FunctionManifest::new(REWRITE_URL_NAME, Stage::ViewerRequest)
            .with_comment("resolve pretty URLs to index documents");
        template.add(resources::edge_function(
            "RewriteUrlFunction",
            &manifest,
            REWRITE_URL_CODE,
        ))?;

        template.add(resources::distribution(
            "Distribution",
            &self.params,
            "SiteBucket",
            "OriginAccessIdentity",
            "RewriteUrlFunction",
            manifest.stage.as_str(),
        ))?;

        template.add(resources::alias_record(
            "ARecord",
            RecordType::A,
            &self.params,
            "Distribution",
        ))?;
        template.add(resources::alias_record(
            "AaaaRecord",
            RecordType::Aaaa,
            &self.params,
            "Distribution",
        ))?;

        template.output(
            "DistributionDomainName",
            resources::get_att("Distribution", "DomainName"),
        );
        template.output("SiteBucketName", resources::reference("SiteBucket"));

        Ok(template)
    }

    /// Resolve, declare, and render in one step.
    pub async fn synth(store: &dyn ParameterStore) -> Result<String, StackError> {
        Self::from_store(store).await?.template()?.to_json_pretty()
    }
}
