mod chat;
mod config;
mod exchange;
mod server;
mod websocket;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use tokio::net::TcpListener;
use log::{info, warn, error};

use crate::chat::RandomNames;
use crate::config::Config;
use crate::server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    // Log configuration
    config.log_config();

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    let state = AppState::new(&config, Arc::new(RandomNames))?;

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("WebSocket chat server running at ws://{}", config.bind_address);
    info!("Exchange rates from {}, audit log at {}", config.rate_api_url, config.audit_log_path);

    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install ctrl-c handler: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;

    Ok(())
}
