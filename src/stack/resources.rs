//! Typed resource declarations for the static-website stack.
//!
//! Each constructor produces one declarative resource in the shape the
//! external provisioning engine consumes: a logical id, a resource type,
//! and a properties document. Cross-resource references use the engine's
//! `Ref`/`Fn::GetAtt` intrinsics, so ordering is the engine's problem.

use crate::function::manifest::FunctionManifest;
use crate::stack::params::DeployParams;
use serde_json::{json, Value};

/// Managed caching-optimized cache policy.
pub const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";
/// Fixed hosted zone id for distribution alias targets.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";
/// Edge function runtime identifier.
pub const FUNCTION_RUNTIME: &str = "cloudfront-js-1.0";

/// Source artifact deployed to the edge runtime. Must implement the same
/// mapping as [`crate::function::rewrite_uri`]; the integration tests pin
/// the behavior table both artifacts follow.
pub const REWRITE_URL_CODE: &str = r#"function handler(event) {
    var request = event.request;
    var uri = request.uri;
    if (uri === '') {
        request.uri = '/index.html';
    } else if (uri.endsWith('/')) {
        request.uri = uri + 'index.html';
    } else if (!uri.split('/').pop().includes('.')) {
        request.uri = uri + '/index.html';
    }
    return request;
}
"#;

/// Teardown behavior pinned in the template, overriding the provisioning
/// engine's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    Delete,
    Retain,
}

impl DeletionPolicy {
    /// The attribute value the template uses.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionPolicy::Delete => "Delete",
            DeletionPolicy::Retain => "Retain",
        }
    }
}

/// A declarative resource handed to the provisioning engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Logical id, unique within the template.
    pub logical_id: String,
    /// Resource type identifier.
    pub kind: &'static str,
    /// Properties document.
    pub properties: Value,
    /// Teardown behavior, emitted beside the properties when set.
    pub deletion_policy: Option<DeletionPolicy>,
}

impl Resource {
    /// Create a new resource declaration.
    pub fn new(logical_id: impl Into<String>, kind: &'static str, properties: Value) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind,
            properties,
            deletion_policy: None,
        }
    }

    /// Pin the teardown behavior.
    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }
}

/// `Ref` intrinsic.
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `Fn::GetAtt` intrinsic.
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// Private bucket holding the site objects. All public access is blocked;
/// the distribution reads through its access identity instead. The site
/// tree is rebuildable from the repository, so teardown deletes the bucket
/// rather than orphaning it.
pub fn site_bucket(logical_id: &str) -> Resource {
    Resource::new(
        logical_id,
        "AWS::S3::Bucket",
        json!({
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": true,
                "BlockPublicPolicy": true,
                "IgnorePublicAcls": true,
                "RestrictPublicBuckets": true
            }
        }),
    )
    .with_deletion_policy(DeletionPolicy::Delete)
}

/// Identity the distribution presents when reading from the bucket.
pub fn origin_access_identity(logical_id: &str) -> Resource {
    Resource::new(
        logical_id,
        "AWS::CloudFront::CloudFrontOriginAccessIdentity",
        json!({
            "CloudFrontOriginAccessIdentityConfig": {
                "Comment": "static site origin access"
            }
        }),
    )
}

/// Bucket policy granting object reads to the access identity only.
pub fn bucket_policy(logical_id: &str, bucket_id: &str, identity_id: &str) -> Resource {
    Resource::new(
        logical_id,
        "AWS::S3::BucketPolicy",
        json!({
            "Bucket": reference(bucket_id),
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Action": "s3:GetObject",
                    "Effect": "Allow",
                    "Principal": {
                        "CanonicalUser": get_att(identity_id, "S3CanonicalUserId")
                    },
                    "Resource": {
                        "Fn::Join": ["", [get_att(bucket_id, "Arn"), "/*"]]
                    }
                }]
            }
        }),
    )
}

/// The edge function resource, code artifact included inline.
pub fn edge_function(logical_id: &str, manifest: &FunctionManifest, code: &str) -> Resource {
    Resource::new(
        logical_id,
        "AWS::CloudFront::Function",
        json!({
            "Name": manifest.name,
            "AutoPublish": true,
            "FunctionConfig": {
                "Comment": manifest.comment,
                "Runtime": FUNCTION_RUNTIME
            },
            "FunctionCode": code
        }),
    )
}

/// The distribution: S3 origin behind the access identity, GET/HEAD only,
/// HTTPS enforced, the edge function attached at its manifest's stage.
pub fn distribution(
    logical_id: &str,
    params: &DeployParams,
    bucket_id: &str,
    identity_id: &str,
    function_id: &str,
    stage: &str,
) -> Resource {
    Resource::new(
        logical_id,
        "AWS::CloudFront::Distribution",
        json!({
            "DistributionConfig": {
                "Enabled": true,
                "Aliases": [params.record_name],
                "DefaultRootObject": "index.html",
                "PriceClass": "PriceClass_200",
                "ViewerCertificate": {
                    "AcmCertificateArn": params.certificate_arn,
                    "MinimumProtocolVersion": "TLSv1.2_2021",
                    "SslSupportMethod": "sni-only"
                },
                "Origins": [{
                    "Id": "origin0",
                    "DomainName": get_att(bucket_id, "RegionalDomainName"),
                    "S3OriginConfig": {
                        "OriginAccessIdentity": {
                            "Fn::Join": ["", [
                                "origin-access-identity/cloudfront/",
                                reference(identity_id)
                            ]]
                        }
                    }
                }],
                "DefaultCacheBehavior": {
                    "TargetOriginId": "origin0",
                    "AllowedMethods": ["GET", "HEAD"],
                    "CachedMethods": ["GET", "HEAD"],
                    "CachePolicyId": CACHING_OPTIMIZED_POLICY_ID,
                    "ViewerProtocolPolicy": "redirect-to-https",
                    "FunctionAssociations": [{
                        "EventType": stage,
                        "FunctionARN": get_att(function_id, "FunctionARN")
                    }]
                }
            }
        }),
    )
}

/// DNS record type for the distribution aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

/// Alias record pointing the public hostname at the distribution. The A
/// and AAAA records share everything but the type, so both come from here.
pub fn alias_record(
    logical_id: &str,
    record_type: RecordType,
    params: &DeployParams,
    distribution_id: &str,
) -> Resource {
    Resource::new(
        logical_id,
        "AWS::Route53::RecordSet",
        json!({
            "Name": params.record_name,
            "Type": record_type.as_str(),
            "HostedZoneName": format!("{}.", params.domain_name),
            "AliasTarget": {
                "DNSName": get_att(distribution_id, "DomainName"),
                "HostedZoneId": CLOUDFRONT_HOSTED_ZONE_ID
            }
        }),
    )
}
