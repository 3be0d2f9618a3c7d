use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt};
use log::{info, warn, error};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::exchange::provider::{format_date, FetchError, RateProvider};

/// Rendered in place of a date whose rates could not be fetched.
pub const UNAVAILABLE_PLACEHOLDER: &str = "Не вийшло в мене взнати курс. Приват не відповідає :)";

#[derive(Debug)]
pub enum RateOutcome {
    Rates(Value),
    Unavailable(FetchError),
}

impl RateOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, RateOutcome::Rates(_))
    }
}

#[derive(Debug)]
pub struct DailyRates {
    pub date: String,
    pub outcome: RateOutcome,
}

// Serialized as a one-key object: `{"DD.MM.YYYY": payload-or-placeholder}`.
impl Serialize for DailyRates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_map(Some(1))?;
        match &self.outcome {
            RateOutcome::Rates(payload) => entry.serialize_entry(&self.date, payload)?,
            RateOutcome::Unavailable(_) => entry.serialize_entry(&self.date, UNAVAILABLE_PLACEHOLDER)?,
        }
        entry.end()
    }
}

/// Per-date results, most recent first.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ExchangeReport {
    entries: Vec<DailyRates>,
}

impl ExchangeReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.outcome.is_available()).count()
    }

    pub fn to_message(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize exchange report: {}", e);
                "[]".to_string()
            }
        }
    }
}

/// False when the oldest of the `days` dates ending at `today` is before `NaiveDate::MIN`.
pub fn date_range_fits(today: NaiveDate, days: u32) -> bool {
    match days.checked_sub(1) {
        Some(span) => today.checked_sub_days(Days::new(u64::from(span))).is_some(),
        None => true,
    }
}

/// `today` and the days before it, newest first. Stops early only if the range
/// does not fit, so check `date_range_fits` first.
pub fn requested_dates(today: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..u64::from(days)).map_while(move |offset| today.checked_sub_days(Days::new(offset)))
}

pub struct ExchangeAggregator {
    provider: RateProvider,
    concurrency: usize,
}

impl ExchangeAggregator {
    pub fn new(provider: RateProvider, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run_from(&self, today: NaiveDate, days: u32) -> ExchangeReport {
        // `buffered` keeps date order no matter which request finishes first
        let entries: Vec<DailyRates> = stream::iter(requested_dates(today, days))
            .map(|date| self.fetch_day(date))
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = ExchangeReport { entries };
        if report.is_empty() {
            info!("Exchange lookup for 0 days, nothing to fetch");
        } else {
            info!("Exchange lookup for {} days finished: {} available, {} unavailable",
                  days, report.available_count(), report.len() - report.available_count());
        }
        report
    }

    async fn fetch_day(&self, date: NaiveDate) -> DailyRates {
        let formatted = format_date(date);
        let outcome = match self.provider.fetch(date).await {
            Ok(payload) => RateOutcome::Rates(payload),
            Err(e) => {
                warn!("Rates for {} unavailable: {}", formatted, e);
                RateOutcome::Unavailable(e)
            }
        };

        DailyRates {
            date: formatted,
            outcome,
        }
    }
}
