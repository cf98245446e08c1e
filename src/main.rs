//! sitefront binary: synthesize the stack template or serve the site
//! locally through the viewer-request hook.

use sitefront::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    match mode.as_str() {
        "synth" => synth().await,
        "serve" => serve().await,
        other => {
            eprintln!("usage: sitefront [synth|serve] (got '{other}')");
            std::process::exit(2);
        }
    }
}

/// Resolve deploy parameters from the environment and print the template.
async fn synth() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let store = EnvStore::new();
    let rendered = StaticSiteStack::synth(&store).await?;
    println!("{rendered}");
    Ok(())
}

/// Run the local origin runtime with the rewrite function attached.
async fn serve() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = SiteConfig::from_env();

    tracing::info!("serving {} on {}", config.site_root.display(), config.bind_addr());
    tracing::info!("try: curl http://localhost:{}/about", config.port);
    tracing::info!("status: curl http://localhost:{}/_status", config.port);

    let server = SiteServer::new(config).with_viewer_request_function(Arc::new(RewriteUrl))?;
    server.run().await
}
