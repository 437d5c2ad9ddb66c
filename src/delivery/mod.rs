//! Getting reports to the people reading them.

pub mod telegram;

pub use telegram::TelegramDeliverer;

use async_trait::async_trait;
use std::io::Write;
use thiserror::Error;
use tracing::warn;

use crate::config::TelegramConfig;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by messaging api ({status}): {description}")]
    Rejected {
        status: reqwest::StatusCode,
        description: String,
    },

    #[error("http client setup failed: {0}")]
    Client(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sends one report somewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError>;
}

/// The deliverer the bot runs with: Telegram when configured, otherwise a
/// no-op that says so in the logs.
#[derive(Debug)]
pub enum Notifier {
    Telegram(TelegramDeliverer),
    Disabled,
}

impl Notifier {
    pub fn from_config(telegram: Option<&TelegramConfig>) -> Result<Self, DeliveryError> {
        match telegram {
            Some(cfg) => Ok(Self::Telegram(TelegramDeliverer::new(cfg)?)),
            None => {
                warn!("BOT_TOKEN or CHAT_ID not set; reports will be logged, not sent");
                Ok(Self::Disabled)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Telegram(_))
    }
}

#[async_trait]
impl Deliverer for Notifier {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        match self {
            Self::Telegram(telegram) => telegram.deliver(text).await,
            Self::Disabled => {
                warn!(
                    chars = text.chars().count(),
                    "delivery not configured, report not sent"
                );
                Ok(())
            }
        }
    }
}

/// Writes each report to stdout, separated by a blank line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutDeliverer;

#[async_trait]
impl Deliverer for StdoutDeliverer {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}\n")?;
        out.flush()?;
        Ok(())
    }
}
