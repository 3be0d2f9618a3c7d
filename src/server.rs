use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use log::{info, warn};

use crate::chat::{BroadcastService, CommandDispatcher, ConnectionRegistry, NameSupplier};
use crate::config::{Config, FETCH_CONCURRENCY};
use crate::exchange::{AuditLog, ExchangeAggregator, RateProvider};
use crate::websocket::WebSocketHandler;

/// Everything a connection task needs, shared across all of them.
#[derive(Clone)]
pub struct AppState {
    pub registry: ConnectionRegistry,
    pub dispatcher: Arc<CommandDispatcher>,
}

impl AppState {
    pub fn new(config: &Config, names: Arc<dyn NameSupplier>) -> Result<Self, reqwest::Error> {
        let provider = RateProvider::new(config.rate_api_url.clone(), config.request_timeout())?;
        let registry = ConnectionRegistry::new(names);

        let dispatcher = CommandDispatcher::new(
            BroadcastService::new(registry.clone()),
            ExchangeAggregator::new(provider, FETCH_CONCURRENCY),
            AuditLog::new(&config.audit_log_path),
            config.max_exchange_days,
        );

        Ok(Self {
            registry,
            dispatcher: Arc::new(dispatcher),
        })
    }
}

/// Accepts connections until `shutdown` resolves. Each client runs in its own task.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if state.registry.is_empty() {
                    info!("Shutting down");
                } else {
                    info!("Shutting down, {} clients still connected", state.registry.len());
                }
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        let handler = WebSocketHandler::new(state.clone(), addr.to_string());
                        tokio::spawn(handler.handle_connection(stream));
                    }
                    Err(e) => warn!("Failed to accept connection: {}", e),
                }
            }
        }
    }
}
