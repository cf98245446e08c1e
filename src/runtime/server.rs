//! Local origin runtime.
//!
//! Emulates the edge + origin pair on one listener: each request passes
//! through the associated viewer-request function, and the rewritten URI
//! is resolved against the local directory origin exactly the way the CDN
//! resolves object keys against the bucket.

use crate::function::registry::FunctionRegistry;
use crate::http::{Method, OriginResponse, StatusCode, ViewerRequest};
use crate::origin::{DirOrigin, ObjectKey};
use crate::runtime::SiteConfig;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// The local site server.
pub struct SiteServer {
    config: SiteConfig,
    state: Arc<ServerState>,
}

struct ServerState {
    registry: FunctionRegistry,
    origin: DirOrigin,
    /// Name of the function associated at the viewer-request stage.
    viewer_request_function: Option<String>,
    default_root_object: String,
}

impl SiteServer {
    /// Create a server from config with an empty function registry.
    pub fn new(config: SiteConfig) -> Self {
        let state = Arc::new(ServerState {
            registry: FunctionRegistry::new(),
            origin: DirOrigin::new(config.site_root.clone()),
            viewer_request_function: None,
            default_root_object: config.default_root_object.clone(),
        });
        Self { config, state }
    }

    /// Register a function and associate it at the viewer-request stage,
    /// the way the distribution declaration binds exactly one function to
    /// its default behavior.
    pub fn with_viewer_request_function(
        mut self,
        function: Arc<dyn crate::function::ViewerFunction>,
    ) -> Result<Self, crate::function::FunctionError> {
        let name = function.name().to_string();
        let state = Arc::get_mut(&mut self.state)
            .ok_or_else(|| crate::function::FunctionError::new("server already running"))?;
        state.registry.register(function)?;
        state.viewer_request_function = Some(name);
        Ok(self)
    }

    /// Bind the configured address without accepting yet. Binding first
    /// lets a caller on port 0 discover the assigned port.
    pub async fn bind(self) -> Result<BoundSiteServer, Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        Ok(BoundSiteServer {
            listener,
            state: self.state,
        })
    }

    /// Start the HTTP server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.bind().await?.serve().await
    }
}

/// A site server with its listener bound.
pub struct BoundSiteServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl BoundSiteServer {
    /// The address the listener actually bound.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections until dropped.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "site server listening on {} (root: {})",
            self.listener.local_addr()?,
            self.state.origin.root().display()
        );

        loop {
            let (stream, remote_addr) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = self.state.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let state = state.clone();
                    async move { handle_request(req, state, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle one inbound request: viewer function, then origin lookup.
async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ServerState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    let method = Method::from(req.method());

    debug!("handling request: {} {} from {}", method, path, remote_addr);

    if path == "/_status" {
        let functions = state.registry.list();
        let status = serde_json::json!({
            "functions": functions.iter().map(|(name, invocations)| {
                serde_json::json!({ "name": name, "invocations": invocations })
            }).collect::<Vec<_>>()
        });
        return Ok(build_response(
            OriginResponse::json(&status)
                .unwrap_or_else(|_| OriginResponse::text(StatusCode::OK, "{}")),
        ));
    }

    // The distribution only allows GET and HEAD.
    if !method.is_cacheable() {
        return Ok(build_response(OriginResponse::text(
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed",
        )));
    }

    let mut viewer_request = ViewerRequest::new(method, &path);
    if let Some(query) = req.uri().query() {
        viewer_request.querystring = query.to_string();
    }
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            viewer_request
                .headers
                .insert(name.as_str().to_string(), v.to_string());
        }
    }

    // A failing viewer function never fails the request: forward the
    // original and let the origin answer, per the edge contract.
    let viewer_request = match &state.viewer_request_function {
        Some(name) => match state.registry.invoke(name, viewer_request.clone()) {
            Ok(rewritten) => rewritten,
            Err(e) => {
                warn!("viewer function '{}' failed: {}", name, e);
                viewer_request
            }
        },
        None => viewer_request,
    };

    let mut key = ObjectKey::from_uri(&viewer_request.uri);
    if key.is_empty() {
        key = ObjectKey::from(state.default_root_object.as_str());
    }

    // A key with dot segments can never name an uploaded object; answer
    // 403 the way the storage layer answers denied reads.
    if key.is_traversal() {
        return Ok(build_response(OriginResponse::text(
            StatusCode::FORBIDDEN,
            "forbidden",
        )));
    }

    let response = match state.origin.get(&key) {
        Ok(Some(object)) => {
            let mut response = OriginResponse::object(object.body, object.content_type);
            if viewer_request.method == Method::Head {
                response.body = None;
            }
            response
        }
        Ok(None) => not_found(&state),
        Err(e) => {
            error!("origin read failed for '{}': {}", key, e);
            OriginResponse::text(StatusCode::INTERNAL_SERVER_ERROR, "origin error")
        }
    };

    Ok(build_response(response))
}

/// 404 with the site's error document when one is uploaded.
fn not_found(state: &ServerState) -> OriginResponse {
    match state.origin.get(&ObjectKey::from("404.html")) {
        Ok(Some(object)) => OriginResponse::new(StatusCode::NOT_FOUND)
            .header("Content-Type", object.content_type)
            .body(object.body),
        _ => OriginResponse::text(StatusCode::NOT_FOUND, "not found"),
    }
}

/// Build a hyper Response from an OriginResponse.
fn build_response(origin_response: OriginResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(origin_response.status.0).unwrap_or_else(|_| {
        warn!(
            "invalid status code {}, falling back to 500",
            origin_response.status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = Response::builder().status(status);
    for (name, value) in origin_response.headers {
        builder = builder.header(name, value);
    }

    let body = origin_response.body.unwrap_or_default();
    builder.body(Full::new(body)).unwrap()
}
