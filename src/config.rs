use std::env;
use std::time::Duration;
use log::warn;

// Server Configuration
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

// Rate API Configuration
pub const DEFAULT_RATE_API_URL: &str = "https://api.privatbank.ua/p24api/exchange_rates";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const FETCH_CONCURRENCY: usize = 4;

// Audit Configuration
pub const DEFAULT_AUDIT_LOG_PATH: &str = "exchange.log";

// Per-client outbound queue
pub const OUTBOUND_QUEUE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub rate_api_url: String,
    pub audit_log_path: String,
    pub max_exchange_days: Option<u32>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            rate_api_url: env::var("RATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_RATE_API_URL.to_string()),
            audit_log_path: env::var("AUDIT_LOG_PATH")
                .unwrap_or_else(|_| DEFAULT_AUDIT_LOG_PATH.to_string()),
            max_exchange_days: env::var("EXCHANGE_MAX_DAYS")
                .ok()
                .and_then(|raw| match raw.parse() {
                    Ok(days) => Some(days),
                    Err(_) => {
                        warn!("EXCHANGE_MAX_DAYS={} is not a number, ignoring", raw);
                        None
                    }
                }),
            request_timeout_secs: env::var("RATE_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.trim().is_empty() {
            return Err("Bind address must not be empty".to_string());
        }

        if !self.rate_api_url.starts_with("http://") && !self.rate_api_url.starts_with("https://") {
            return Err(format!("Rate API URL must be http(s): {}", self.rate_api_url));
        }

        if self.audit_log_path.trim().is_empty() {
            return Err("Audit log path must not be empty".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("Rate request timeout must be at least 1 second".to_string());
        }

        if self.max_exchange_days == Some(0) {
            return Err("EXCHANGE_MAX_DAYS must be positive when set".to_string());
        }

        Ok(())
    }

    pub fn log_config(&self) {
        println!("Server Configuration:");
        println!("  Bind Address: {}", self.bind_address);
        println!("  Rate API: {}", self.rate_api_url);
        println!("  Audit Log: {}", self.audit_log_path);
        match self.max_exchange_days {
            Some(days) => println!("  Exchange Day Cap: {}", days),
            None => println!("  Exchange Day Cap: none"),
        }
        println!("  Request Timeout: {}s", self.request_timeout_secs);
        println!("  Log Level: {}", self.log_level);
    }
}
