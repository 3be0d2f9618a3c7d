pub mod provider;
pub mod aggregator;
pub mod audit;

pub use provider::RateProvider;
pub use aggregator::ExchangeAggregator;
pub use audit::{AuditLog, EXCHANGE_EVENT};
