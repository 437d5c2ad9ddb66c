//! The scan/deliver loop.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::{Config, LeagueSource};
use crate::delivery::Deliverer;
use crate::extractor::{
    KeywordStatsExtractor, ListingExtractor, MatchListExtractor, StatsExtractor,
};
use crate::fetcher::PageSource;
use crate::report::{Report, ReportLanguage};
use crate::scan;

/// Dispatcher settings
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    pub sources: Vec<LeagueSource>,
    pub max_matches_per_source: usize,
    pub throttle: Duration,
    pub cycle_interval: Duration,
    pub language: ReportLanguage,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sources: crate::config::default_sources(),
            max_matches_per_source: 8,
            throttle: Duration::from_millis(1500),
            cycle_interval: Duration::from_secs(300), // 5 minutes
            language: ReportLanguage::default(),
        }
    }
}

impl From<&Config> for DispatchConfig {
    fn from(config: &Config) -> Self {
        Self {
            sources: config.sources().to_vec(),
            max_matches_per_source: config.max_matches_per_source(),
            throttle: config.throttle(),
            cycle_interval: config.cycle_interval(),
            language: config.report_language(),
        }
    }
}

/// What one pass over the sources did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub sources_scanned: usize,
    pub matches_found: usize,
    pub reports_composed: usize,
    pub reports_delivered: usize,
    pub delivery_failures: usize,
}

impl CycleSummary {
    pub fn found_any(&self) -> bool {
        self.matches_found > 0
    }
}

/// Walks the configured leagues, composes a report per match and hands it to
/// the deliverer, one call at a time.
pub struct Dispatcher {
    config: DispatchConfig,
    fetcher: Arc<dyn PageSource>,
    deliverer: Arc<dyn Deliverer>,
    listing: Arc<dyn MatchListExtractor>,
    stats: Arc<dyn StatsExtractor>,
}

impl Dispatcher {
    pub fn new(
        config: DispatchConfig,
        fetcher: Arc<dyn PageSource>,
        deliverer: Arc<dyn Deliverer>,
    ) -> Self {
        Self {
            config,
            fetcher,
            deliverer,
            listing: Arc::new(ListingExtractor::default()),
            stats: Arc::new(KeywordStatsExtractor::default()),
        }
    }

    /// Swap the page parsers, e.g. after a site redesign.
    pub fn with_extractors(
        mut self,
        listing: Arc<dyn MatchListExtractor>,
        stats: Arc<dyn StatsExtractor>,
    ) -> Self {
        self.listing = listing;
        self.stats = stats;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// One pass over every source. Never fails: fetch problems show up as
    /// empty leagues and delivery problems as `delivery_failures`.
    pub async fn run_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for source in &self.config.sources {
            summary.sources_scanned += 1;
            let matches =
                scan::league_matches(self.fetcher.as_ref(), self.listing.as_ref(), source).await;
            if matches.is_empty() {
                continue;
            }
            summary.matches_found += matches.len();

            for m in matches.iter().take(self.config.max_matches_per_source) {
                let stats = scan::match_stats(
                    self.fetcher.as_ref(),
                    self.stats.as_ref(),
                    m.detail_link.as_deref(),
                )
                .await;
                let report = Report::now(m, &stats, self.config.language);
                summary.reports_composed += 1;

                match self.deliverer.deliver(&report.text).await {
                    Ok(()) => {
                        summary.reports_delivered += 1;
                        info!(
                            league = %source.name,
                            home = %m.home,
                            away = %m.away,
                            trend = report.trend.as_str(),
                            "report delivered"
                        );
                    }
                    Err(e) => {
                        summary.delivery_failures += 1;
                        warn!(
                            league = %source.name,
                            home = %m.home,
                            away = %m.away,
                            "report delivery failed: {e}"
                        );
                    }
                }

                sleep(self.config.throttle).await;
            }
        }

        if !summary.found_any() {
            info!("No matches found in the watched leagues right now");
        }
        summary
    }

    /// Run cycles until `shutdown` is cancelled.
    ///
    /// Each cycle runs in its own task so a panic inside an extractor or a
    /// deliverer costs that cycle only.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let run_id = Uuid::new_v4();
        info!(
            "Starting dispatcher {} - sources: {}, cap: {}, throttle: {}ms, interval: {}s",
            run_id,
            self.config.sources.len(),
            self.config.max_matches_per_source,
            self.config.throttle.as_millis(),
            self.config.cycle_interval.as_secs()
        );

        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            let this = Arc::clone(&self);
            let mut task = tokio::spawn(
                async move { this.run_cycle().await }
                    .instrument(info_span!("cycle", run = %run_id, n = cycle)),
            );

            tokio::select! {
                _ = shutdown.cancelled() => {
                    task.abort();
                    info!("Shutdown requested during cycle {}", cycle);
                    break;
                }
                joined = &mut task => match joined {
                    Ok(summary) => info!(
                        cycle,
                        sources = summary.sources_scanned,
                        matches = summary.matches_found,
                        delivered = summary.reports_delivered,
                        failed = summary.delivery_failures,
                        "cycle finished"
                    ),
                    Err(e) if e.is_panic() => error!("Cycle {} abandoned after a panic: {}", cycle, e),
                    Err(e) => error!("Cycle {} did not complete: {}", cycle, e),
                },
            }

            info!(
                "Waiting {}s before the next scan",
                self.config.cycle_interval.as_secs()
            );
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested while idle");
                    break;
                }
                _ = sleep(self.config.cycle_interval) => {}
            }
        }

        info!("Dispatcher stopped after {} cycle(s)", cycle);
    }
}
