//! HTTP API server command

use feedback_desk_core::{
    api::{ApiServer, ApiServerConfig, AppState},
    error::Result,
    AppConfig,
};
use std::net::SocketAddr;
use tracing::debug;

/// Handle API server startup command
pub async fn handle(config: &AppConfig, addr: Option<String>) -> Result<()> {
    debug!("Starting HTTP API server...");

    let addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", addr, e))?;

    let state = AppState::from_config(config)?;

    println!();
    println!("Feedback Desk API");
    println!();
    println!("   Address:    http://{}", socket_addr);
    println!("   Data file:  {}", config.data_file.display());
    println!("   Model:      {}", config.llm.model);
    println!();
    println!("   Endpoints:");
    println!("   - POST /feedback         - Submit a rating and review");
    println!("   - POST /admin/login      - Exchange the admin password for a token");
    println!("   - POST /admin/logout     - Drop an admin token");
    println!("   - GET  /admin/feedback   - Filtered records, summary and attention list");
    println!("   - GET  /admin/export     - Filtered records as CSV");
    println!("   - GET  /health           - Health check");
    println!();

    let server = ApiServer::new(ApiServerConfig { addr: socket_addr }, state);
    server.serve().await?;

    Ok(())
}
