use chrono::Local;
use log::info;

use crate::chat::broadcast::BroadcastService;
use crate::exchange::aggregator::date_range_fits;
use crate::exchange::{AuditLog, ExchangeAggregator, EXCHANGE_EVENT};

pub const EXCHANGE_PREFIX: &str = "exchange";
pub const GREETING: &str = "Hello server";
pub const GREETING_REPLY: &str = "Привіт мої карапузи!";
pub const EXCHANGE_USAGE: &str = "Невірний формат команди exchange. Введіть exchange <кількість днів>";

pub fn day_cap_message(cap: u32) -> String {
    format!("Недопустима кількість днів. Максимально дозволено {}.", cap)
}

/// Classification of one inbound chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Exchange { days: u32 },
    MalformedExchange,
    Greeting,
    Chat(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(message: &'a str) -> Self {
        if message.starts_with(EXCHANGE_PREFIX) {
            let parts: Vec<&str> = message.split_whitespace().collect();
            return match parts.as_slice() {
                [_, days] if is_digits(days) => days
                    .parse()
                    .map(|days| Command::Exchange { days })
                    .unwrap_or(Command::MalformedExchange),
                _ => Command::MalformedExchange,
            };
        }

        if message == GREETING {
            return Command::Greeting;
        }

        Command::Chat(message)
    }
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

pub struct CommandDispatcher {
    broadcaster: BroadcastService,
    aggregator: ExchangeAggregator,
    audit: AuditLog,
    max_days: Option<u32>,
}

impl CommandDispatcher {
    pub fn new(
        broadcaster: BroadcastService,
        aggregator: ExchangeAggregator,
        audit: AuditLog,
        max_days: Option<u32>,
    ) -> Self {
        Self {
            broadcaster,
            aggregator,
            audit,
            max_days,
        }
    }

    /// Handles one message from `sender`. Every outcome is a broadcast; nothing is returned to the transport.
    pub async fn dispatch(&self, sender: &str, message: &str) {
        match Command::parse(message) {
            Command::Exchange { days } => self.run_exchange(sender, days).await,
            Command::MalformedExchange => {
                info!("Malformed exchange command from {}: {:?}", sender, message);
                self.broadcaster.broadcast(EXCHANGE_USAGE);
            }
            Command::Greeting => {
                self.broadcaster.broadcast(GREETING_REPLY);
            }
            Command::Chat(text) => {
                self.broadcaster.broadcast(&format!("{}: {}", sender, text));
            }
        }
    }

    async fn run_exchange(&self, sender: &str, days: u32) {
        if let Some(cap) = self.max_days {
            if days > cap {
                info!("{} asked for {} days of rates, cap is {}", sender, days, cap);
                self.broadcaster.broadcast(&day_cap_message(cap));
                return;
            }
        }

        let today = Local::now().date_naive();
        if !date_range_fits(today, days) {
            info!("{} asked for {} days of rates, past the earliest calendar date", sender, days);
            self.broadcaster.broadcast(EXCHANGE_USAGE);
            return;
        }

        info!("{} requested exchange rates for {} days", sender, days);
        self.audit.append(EXCHANGE_EVENT).await;
        let report = self.aggregator.run_from(today, days).await;
        self.broadcaster.broadcast(&report.to_message());
    }
}
