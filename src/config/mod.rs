//! Configuration handling for the bot.
//!
//! Everything is read once at startup by `Config::from_env` and then passed
//! around as a plain value. Nothing else in the crate reads the environment.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::report::ReportLanguage;

/// Environment variable names. Public so tests and the binaries can refer
/// to them.
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_BOT_TOKEN_FALLBACK: &str = "TOKEN";
pub const ENV_CHAT_ID: &str = "CHAT_ID";
pub const ENV_SEND_TO: &str = "SEND_TO";
pub const ENV_TELEGRAM_API_BASE: &str = "TELEGRAM_API_BASE";
pub const ENV_PORT: &str = "PORT";
pub const ENV_BIND_HOST: &str = "BIND_HOST";
pub const ENV_LEAGUE_SOURCES: &str = "LEAGUE_SOURCES";
pub const ENV_MAX_MATCHES: &str = "MAX_MATCHES_PER_SOURCE";
pub const ENV_THROTTLE_MS: &str = "THROTTLE_MS";
pub const ENV_CYCLE_INTERVAL_SECS: &str = "CYCLE_INTERVAL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "USER_AGENT";
pub const ENV_REPORT_LANG: &str = "REPORT_LANG";

const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_MAX_MATCHES: usize = 8;
const DEFAULT_THROTTLE_MS: u64 = 1500;
const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 300;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36";

const DEFAULT_SOURCES: [(&str, &str); 4] = [
    (
        "Brasileirão Série A",
        "https://www.flashscore.com.br/futebol/brasil/serie-a/",
    ),
    (
        "Premier League",
        "https://www.flashscore.com.br/futebol/inglaterra/premier-league/",
    ),
    (
        "Champions League",
        "https://www.flashscore.com.br/futebol/champions-league/",
    ),
    (
        "La Liga",
        "https://www.flashscore.com.br/futebol/espanha/la-liga/",
    ),
];

/// One competition listing page to scan every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueSource {
    pub name: String,
    pub url: Url,
}

impl LeagueSource {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }
}

/// Bot credential plus the chat the reports go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: Url,
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    telegram: Option<TelegramConfig>,
    bind_addr: SocketAddr,
    sources: Vec<LeagueSource>,
    max_matches_per_source: usize,
    throttle: Duration,
    cycle_interval: Duration,
    fetch_timeout: Duration,
    user_agent: String,
    report_language: ReportLanguage,
}

impl Config {
    /// Load from environment variables, falling back to production defaults.
    ///
    /// A missing credential or destination is not an error: delivery is
    /// simply disabled. Malformed values are.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = var(ENV_BOT_TOKEN).or_else(|| var(ENV_BOT_TOKEN_FALLBACK));
        let chat_id = var(ENV_CHAT_ID);
        let destination = var(ENV_SEND_TO).or(chat_id);
        let api_base = match var(ENV_TELEGRAM_API_BASE) {
            Some(raw) => parse_url(ENV_TELEGRAM_API_BASE, &raw)?,
            None => parse_url(ENV_TELEGRAM_API_BASE, DEFAULT_TELEGRAM_API_BASE)?,
        };
        let telegram = match (token, destination) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token,
                chat_id,
                api_base,
            }),
            _ => None,
        };

        let host = match var(ENV_BIND_HOST) {
            Some(raw) => parse_host(&raw)?,
            None => parse_host(DEFAULT_BIND_HOST)?,
        };
        let port: u16 = parse_number(ENV_PORT, DEFAULT_PORT)?;
        let bind_addr = SocketAddr::new(host, port);

        let sources = match var(ENV_LEAGUE_SOURCES) {
            Some(raw) => parse_sources(&raw)?,
            None => default_sources(),
        };

        let report_language = match var(ENV_REPORT_LANG) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                field: ENV_REPORT_LANG,
                reason,
            })?,
            None => ReportLanguage::default(),
        };

        Ok(Self {
            telegram,
            bind_addr,
            sources,
            max_matches_per_source: parse_number(ENV_MAX_MATCHES, DEFAULT_MAX_MATCHES)?,
            throttle: Duration::from_millis(parse_number(ENV_THROTTLE_MS, DEFAULT_THROTTLE_MS)?),
            cycle_interval: Duration::from_secs(parse_number(
                ENV_CYCLE_INTERVAL_SECS,
                DEFAULT_CYCLE_INTERVAL_SECS,
            )?),
            fetch_timeout: Duration::from_secs(parse_number(
                ENV_FETCH_TIMEOUT_SECS,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            user_agent: var(ENV_USER_AGENT).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            report_language,
        })
    }

    /// Telegram settings, or `None` when delivery is disabled.
    pub fn telegram(&self) -> Option<&TelegramConfig> {
        self.telegram.as_ref()
    }
    /// Address for the liveness server.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
    pub fn sources(&self) -> &[LeagueSource] {
        &self.sources
    }
    pub fn max_matches_per_source(&self) -> usize {
        self.max_matches_per_source
    }
    /// Pause after each delivered report.
    pub fn throttle(&self) -> Duration {
        self.throttle
    }
    /// Idle time between two cycles.
    pub fn cycle_interval(&self) -> Duration {
        self.cycle_interval
    }
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
    pub fn report_language(&self) -> ReportLanguage {
        self.report_language
    }
}

/// IPv4 or IPv6 literal (brackets optional), or `localhost`.
fn parse_host(raw: &str) -> Result<IpAddr, ConfigError> {
    if raw.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    raw.trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .map_err(|e| ConfigError::InvalidValue {
            field: ENV_BIND_HOST,
            reason: format!("{e}"),
        })
}

/// The four FlashScore BR leagues the bot watches out of the box.
pub fn default_sources() -> Vec<LeagueSource> {
    DEFAULT_SOURCES
        .iter()
        .filter_map(|(name, url)| Url::parse(url).ok().map(|url| LeagueSource::new(*name, url)))
        .collect()
}

/// Parse `Name=url;Name=url`. Order is kept.
pub fn parse_sources(raw: &str) -> Result<Vec<LeagueSource>, ConfigError> {
    let mut sources = Vec::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, url) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidValue {
                field: ENV_LEAGUE_SOURCES,
                reason: format!("expected Name=url, got '{entry}'"),
            })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: ENV_LEAGUE_SOURCES,
                reason: format!("missing league name in '{entry}'"),
            });
        }
        sources.push(LeagueSource::new(
            name,
            parse_url(ENV_LEAGUE_SOURCES, url.trim())?,
        ));
    }
    if sources.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: ENV_LEAGUE_SOURCES,
            reason: "no sources given".to_string(),
        });
    }
    Ok(sources)
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T>(field: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(field) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field,
            reason: format!("'{raw}': {e}"),
        }),
        None => Ok(default),
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: format!("'{raw}': {e}"),
    })
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
