use std::time::Duration;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Date format the rate API expects in its `date` query parameter.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate API answered with status {0}")]
    Status(StatusCode),
    #[error("rate API request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("rate API returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Thin client over the external exchange-rate endpoint. One request per date.
#[derive(Clone)]
pub struct RateProvider {
    client: Client,
    base_url: String,
}

impl RateProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, date: NaiveDate) -> String {
        format!("{}?json&date={}", self.base_url, format_date(date))
    }

    /// Only a 200 counts as success; the body is returned as raw JSON.
    pub async fn fetch(&self, date: NaiveDate) -> Result<Value, FetchError> {
        let response = self.client
            .get(self.url_for(date))
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }

        response.json::<Value>().await.map_err(FetchError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port_url, RateStub};

    fn provider(base_url: &str) -> RateProvider {
        RateProvider::new(base_url, Duration::from_secs(2)).expect("client should build")
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_format_date_pads_day_and_month() {
        assert_eq!(format_date(date(5)), "05.03.2024");
    }

    #[test]
    fn test_url_for_appends_query() {
        let provider = provider("http://rates.local/p24api/exchange_rates");
        assert_eq!(
            provider.url_for(date(1)),
            "http://rates.local/p24api/exchange_rates?json&date=01.03.2024"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_raw_payload_on_success() {
        let stub = RateStub::spawn().await;
        let payload = provider(&stub.base_url).fetch(date(1)).await.expect("fetch should succeed");

        assert_eq!(payload["date"], "01.03.2024");
        assert!(payload["exchangeRate"].is_array());
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_fetch_reports_non_200_status() {
        let stub = RateStub::with_failures(&["02.03.2024"], &[]).await;
        let result = provider(&stub.base_url).fetch(date(2)).await;

        assert!(matches!(result, Err(FetchError::Status(status)) if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_fetch_reports_unreadable_body() {
        let stub = RateStub::with_failures(&[], &["03.03.2024"]).await;
        let result = provider(&stub.base_url).fetch(date(3)).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_reports_transport_failure() {
        let result = provider(&closed_port_url()).fetch(date(4)).await;

        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
