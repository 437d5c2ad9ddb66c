use std::sync::Arc;

use anyhow::Result;
use matchscout::{
    config::Config,
    delivery::Notifier,
    dispatcher::{DispatchConfig, Dispatcher},
    fetcher::HttpFetcher,
    health,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let fetcher = Arc::new(HttpFetcher::new(
        config.user_agent(),
        config.fetch_timeout(),
    )?);
    let notifier = Arc::new(Notifier::from_config(config.telegram())?);
    info!(
        "Delivery {}",
        if notifier.is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );

    let dispatcher = Arc::new(Dispatcher::new(
        DispatchConfig::from(&config),
        fetcher,
        notifier,
    ));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    let listener = health::bind(config.bind_addr()).await?;
    let server_token = shutdown.clone();
    let server = tokio::spawn(async move {
        let result = health::serve(listener, server_token.clone()).await;
        if let Err(e) = &result {
            error!("Liveness server failed: {:#}", e);
            server_token.cancel();
        }
        result
    });

    dispatcher.run(shutdown.clone()).await;

    // the dispatcher only returns once cancelled, but make sure the server follows
    shutdown.cancel();
    let served = match server.await {
        Ok(result) => result,
        Err(e) => Err(e.into()),
    };

    info!("Shutting down");
    served
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
