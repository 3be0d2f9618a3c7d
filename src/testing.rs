//! Test fixtures: a local stand-in for the rate API and deterministic names.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::chat::NameSupplier;

pub const RATES_PATH: &str = "/p24api/exchange_rates";

#[derive(Clone, Default)]
struct StubState {
    failing: Arc<HashSet<String>>,
    garbled: Arc<HashSet<String>>,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
}

/// HTTP server on an ephemeral port answering like the public rate API.
pub struct RateStub {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl RateStub {
    pub async fn spawn() -> Self {
        Self::with_failures(&[], &[]).await
    }

    /// Dates in `failing` answer 503, dates in `garbled` answer 200 with a non-JSON body.
    pub async fn with_failures(failing: &[&str], garbled: &[&str]) -> Self {
        Self::start(StubState {
            failing: Arc::new(failing.iter().map(|d| d.to_string()).collect()),
            garbled: Arc::new(garbled.iter().map(|d| d.to_string()).collect()),
            ..StubState::default()
        })
        .await
    }

    /// Every request waits `delay` before answering.
    pub async fn with_delay(delay: Duration) -> Self {
        Self::start(StubState {
            delay: Some(delay),
            ..StubState::default()
        })
        .await
    }

    async fn start(state: StubState) -> Self {
        let hits = state.hits.clone();

        let app = Router::new()
            .route(RATES_PATH, get(rates))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind rate stub");
        let addr = listener.local_addr().expect("rate stub address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}{}", addr, RATES_PATH),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn rates(State(stub): State<StubState>, Query(params): Query<HashMap<String, String>>) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let date = params.get("date").cloned().unwrap_or_default();
    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }

    if stub.failing.contains(&date) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if stub.garbled.contains(&date) {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    Json(sample_payload(&date)).into_response()
}

pub fn sample_payload(date: &str) -> Value {
    json!({
        "date": date,
        "bank": "PB",
        "baseCurrency": 980,
        "baseCurrencyLit": "UAH",
        "exchangeRate": [
            {
                "baseCurrency": "UAH",
                "currency": "USD",
                "saleRateNB": 41.25,
                "purchaseRateNB": 41.25,
                "saleRate": 41.6,
                "purchaseRate": 41.0
            },
            {
                "baseCurrency": "UAH",
                "currency": "EUR",
                "saleRateNB": 44.9,
                "purchaseRateNB": 44.9,
                "saleRate": 45.3,
                "purchaseRate": 44.5
            }
        ]
    })
}

/// URL on a port nobody listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}{}", addr, RATES_PATH)
}

pub fn temp_audit_path() -> PathBuf {
    std::env::temp_dir().join(format!("exchange-chat-audit-{}.log", Uuid::new_v4()))
}

/// Hands out "Client 1", "Client 2", ... in registration order.
#[derive(Default)]
pub struct NumberedNames {
    issued: AtomicUsize,
}

impl NameSupplier for NumberedNames {
    fn next_name(&self) -> String {
        format!("Client {}", self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
