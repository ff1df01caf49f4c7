mod config;
mod error;
mod server;
mod store;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::AppError;
use server::UnifiedGuidanceServer;
use store::FileMappingStore;
use unified_core::pipeline::MappingSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr (stdout is reserved for MCP JSON-RPC)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting unified-guidance MCP server");

    let config = Config::from_env()?;
    let default_frameworks = config.default_frameworks();
    info!(
        mappings_path = %config.mappings_path,
        default_cis = default_frameworks.cis_controls.as_str(),
        "configuration loaded"
    );

    // Fail fast on an unreadable document; requests re-read it anyway.
    let store = FileMappingStore::new(config.mappings_file_path());
    let mappings = store
        .get_mappings(&default_frameworks)
        .map_err(AppError::from)?;
    info!(categories = mappings.len(), "mapping document validated");

    let server = UnifiedGuidanceServer::new(store, default_frameworks);

    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                tracing::info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                tracing::info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
