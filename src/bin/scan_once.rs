use std::{sync::Arc, time::Duration};

use anyhow::Result;
use matchscout::{
    config::Config,
    delivery::StdoutDeliverer,
    dispatcher::{DispatchConfig, Dispatcher},
    fetcher::HttpFetcher,
};

/// Runs a single scan against the live sources and prints the reports
/// instead of sending them.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let fetcher = Arc::new(HttpFetcher::new(
        config.user_agent(),
        config.fetch_timeout(),
    )?);

    let dispatch_config = DispatchConfig {
        throttle: Duration::ZERO,
        ..DispatchConfig::from(&config)
    };
    let dispatcher = Dispatcher::new(dispatch_config, fetcher, Arc::new(StdoutDeliverer));

    eprintln!(
        "Scanning {} source(s), up to {} match(es) each",
        dispatcher.config().sources.len(),
        dispatcher.config().max_matches_per_source
    );
    let summary = dispatcher.run_cycle().await;
    eprintln!(
        "{} source(s), {} match(es) found, {} report(s) printed",
        summary.sources_scanned, summary.matches_found, summary.reports_delivered
    );
    Ok(())
}
