//! Integration tests for the sitefront edge stack.

use sitefront::prelude::*;
use sitefront::stack::params::{
    MemoryStore, CERTIFICATE_ARN_PARAM, DOMAIN_NAME_PARAM, RECORD_NAME_PARAM,
};
use sitefront::stack::StackError;
use std::fs;
use std::sync::Arc;

/// The behavior table both the Rust function and the deployed code
/// artifact must follow.
const REWRITE_TABLE: &[(&str, &str)] = &[
    ("/", "/index.html"),
    ("", "/index.html"),
    ("/about", "/about/index.html"),
    ("/about/", "/about/index.html"),
    ("/style.css", "/style.css"),
    ("/blog/2024/post", "/blog/2024/post/index.html"),
    ("/v1.2/docs", "/v1.2/docs/index.html"),
    ("/about/index.html", "/about/index.html"),
];

#[test]
fn test_rewrite_behavior_table() {
    for (input, expected) in REWRITE_TABLE {
        assert_eq!(rewrite_uri(input), *expected, "input: {input:?}");
    }
}

#[test]
fn test_rewrite_through_the_function_seam() {
    for (input, expected) in REWRITE_TABLE {
        let out = RewriteUrl.handle(ViewerRequest::get(*input)).unwrap();
        assert_eq!(out.uri, *expected, "input: {input:?}");
    }
}

#[test]
fn test_rewritten_uris_are_stable() {
    for (_, rewritten) in REWRITE_TABLE {
        assert_eq!(rewrite_uri(rewritten), *rewritten);
    }
}

#[test]
fn test_registry_dispatch_and_counts() {
    let registry = FunctionRegistry::new();
    registry.register(Arc::new(RewriteUrl)).unwrap();

    for (input, expected) in REWRITE_TABLE {
        let out = registry
            .invoke("rewrite-url", ViewerRequest::get(*input))
            .unwrap();
        assert_eq!(out.uri, *expected);
    }
    assert_eq!(
        registry.invocations("rewrite-url"),
        Some(REWRITE_TABLE.len() as u64)
    );
}

/// A function that always fails, for exercising the error seam.
struct Failing;

impl ViewerFunction for Failing {
    fn handle(&self, _request: ViewerRequest) -> Result<ViewerRequest, FunctionError> {
        Err(FunctionError::new("boom"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[test]
fn test_function_errors_surface_at_the_seam_only() {
    let registry = FunctionRegistry::new();
    registry.register(Arc::new(Failing)).unwrap();
    let err = registry
        .invoke("failing", ViewerRequest::get("/about"))
        .unwrap_err();
    assert_eq!(err.message, "boom");
}

fn directory_style_site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("about")).unwrap();
    fs::create_dir_all(root.join("blog/2024/post")).unwrap();
    fs::write(root.join("index.html"), "home").unwrap();
    fs::write(root.join("about/index.html"), "about").unwrap();
    fs::write(root.join("blog/2024/post/index.html"), "post").unwrap();
    fs::write(root.join("style.css"), "body{}").unwrap();
    dir
}

#[test]
fn test_pretty_routes_resolve_against_the_site_layout() {
    let dir = directory_style_site();
    let origin = DirOrigin::new(dir.path());

    for uri in ["/", "/about", "/about/", "/blog/2024/post", "/style.css"] {
        let rewritten = rewrite_uri(uri);
        let key = ObjectKey::from_uri(&rewritten);
        assert!(
            origin.get(&key).unwrap().is_some(),
            "uri {uri:?} rewrote to {rewritten:?}, which resolved nothing"
        );
    }
}

#[test]
fn test_upload_manifest_round_trips_through_the_rewrite() {
    let dir = directory_style_site();
    let origin = DirOrigin::new(dir.path());

    // Every index document uploaded from the site tree is reachable from
    // its pretty route.
    for (key, _) in origin.walk().unwrap() {
        if let Some(route) = key.as_str().strip_suffix("/index.html") {
            let pretty = format!("/{route}");
            assert_eq!(rewrite_uri(&pretty), format!("/{}", key.as_str()));
        }
    }
}

fn served_site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("about")).unwrap();
    fs::write(root.join("index.html"), "home").unwrap();
    fs::write(root.join("about/index.html"), "about").unwrap();
    fs::write(root.join("404.html"), "gone").unwrap();
    dir
}

async fn spawn_site(
    root: &std::path::Path,
    function: Arc<dyn ViewerFunction>,
) -> std::net::SocketAddr {
    let config = SiteConfig::new().host("127.0.0.1").port(0).site_root(root);
    let server = SiteServer::new(config)
        .with_viewer_request_function(function)
        .unwrap();
    let bound = server.bind().await.unwrap();
    let addr = bound.local_addr().unwrap();
    tokio::spawn(bound.serve());
    addr
}

async fn send(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
) -> (u16, bytes::Bytes) {
    use http_body_util::{BodyExt, Empty};
    use hyper_util::rt::TokioIo;

    let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(conn);

    let request = hyper::Request::builder()
        .method(method)
        .uri(path)
        .header("host", "localhost")
        .body(Empty::<bytes::Bytes>::new())
        .unwrap();
    let response = sender.send_request(request).await.unwrap();
    let status = response.status().as_u16();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn test_server_resolves_pretty_routes_end_to_end() {
    let dir = served_site();
    let addr = spawn_site(dir.path(), Arc::new(RewriteUrl)).await;

    let (status, body) = send(addr, "GET", "/about").await;
    assert_eq!(status, 200);
    assert_eq!(&body[..], b"about");

    let (status, body) = send(addr, "GET", "/").await;
    assert_eq!(status, 200);
    assert_eq!(&body[..], b"home");

    // HEAD resolves the same object without a body.
    let (status, body) = send(addr, "HEAD", "/about").await;
    assert_eq!(status, 200);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_server_serves_error_document_on_miss() {
    let dir = served_site();
    let addr = spawn_site(dir.path(), Arc::new(RewriteUrl)).await;

    let (status, body) = send(addr, "GET", "/missing").await;
    assert_eq!(status, 404);
    assert_eq!(&body[..], b"gone");
}

#[tokio::test]
async fn test_server_rejects_non_cacheable_methods() {
    let dir = served_site();
    let addr = spawn_site(dir.path(), Arc::new(RewriteUrl)).await;

    let (status, _) = send(addr, "POST", "/").await;
    assert_eq!(status, 405);
}

#[tokio::test]
async fn test_server_refuses_traversal_keys() {
    let dir = served_site();
    let addr = spawn_site(dir.path(), Arc::new(RewriteUrl)).await;

    let (status, _) = send(addr, "GET", "/../secrets").await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn test_status_reports_invocation_counts() {
    let dir = served_site();
    let addr = spawn_site(dir.path(), Arc::new(RewriteUrl)).await;

    send(addr, "GET", "/about").await;
    send(addr, "GET", "/missing").await;
    // Disallowed methods and the status endpoint never reach the function.
    send(addr, "POST", "/about").await;

    let (status, body) = send(addr, "GET", "/_status").await;
    assert_eq!(status, 200);
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(document["functions"][0]["name"], "rewrite-url");
    assert_eq!(document["functions"][0]["invocations"], 2);
}

#[tokio::test]
async fn test_failing_function_passes_request_through() {
    let dir = served_site();
    let addr = spawn_site(dir.path(), Arc::new(Failing)).await;

    // The original, unrewritten URI still resolves, so the worst outcome
    // of a broken function is a miss, never a failed request.
    let (status, body) = send(addr, "GET", "/index.html").await;
    assert_eq!(status, 200);
    assert_eq!(&body[..], b"home");

    let (status, _) = send(addr, "GET", "/about").await;
    assert_eq!(status, 404);
}

async fn populated_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.set(RECORD_NAME_PARAM, "www.example.com").await;
    store.set(DOMAIN_NAME_PARAM, "example.com").await;
    store
        .set(CERTIFICATE_ARN_PARAM, "arn:aws:acm:us-east-1:123:certificate/abc")
        .await;
    store
}

#[tokio::test]
async fn test_stack_synthesis_end_to_end() {
    let store = populated_store().await;
    let rendered = StaticSiteStack::synth(&store).await.unwrap();
    let document: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    let resources = document["Resources"].as_object().unwrap();
    for id in [
        "SiteBucket",
        "OriginAccessIdentity",
        "BucketPolicy",
        "RewriteUrlFunction",
        "Distribution",
        "ARecord",
        "AaaaRecord",
    ] {
        assert!(resources.contains_key(id), "missing resource {id}");
    }

    // The function association wires the deployed artifact into the
    // distribution's default behavior at the viewer-request stage.
    let association = &resources["Distribution"]["Properties"]["DistributionConfig"]
        ["DefaultCacheBehavior"]["FunctionAssociations"][0];
    assert_eq!(association["EventType"], "viewer-request");

    let code = resources["RewriteUrlFunction"]["Properties"]["FunctionCode"]
        .as_str()
        .unwrap();
    assert!(code.contains("index.html"));
}

#[tokio::test]
async fn test_synthesis_fails_without_parameters() {
    let store = MemoryStore::new();
    let err = StaticSiteStack::synth(&store).await.unwrap_err();
    assert!(matches!(err, StackError::MissingParameter(_)));
}

#[tokio::test]
async fn test_resolved_params_flow_into_dns_and_tls() {
    let store = populated_store().await;
    let stack = StaticSiteStack::from_store(&store).await.unwrap();
    let document = stack.template().unwrap().to_value();

    assert_eq!(
        document["Resources"]["ARecord"]["Properties"]["HostedZoneName"],
        "example.com."
    );
    assert_eq!(
        document["Resources"]["Distribution"]["Properties"]["DistributionConfig"]
            ["ViewerCertificate"]["AcmCertificateArn"],
        "arn:aws:acm:us-east-1:123:certificate/abc"
    );
}
