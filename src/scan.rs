//! Fetch-then-extract steps. Failures never leave this module: a league
//! page that cannot be fetched has no matches, a detail page that cannot be
//! fetched has no statistics.

use tracing::{debug, info, instrument, warn};

use crate::config::LeagueSource;
use crate::extractor::{MatchListExtractor, MatchStats, MatchSummary, StatsExtractor};
use crate::fetcher::PageSource;

/// Matches listed on one league page, in page order.
#[instrument(skip_all, fields(league = %source.name))]
pub async fn league_matches(
    fetcher: &dyn PageSource,
    extractor: &dyn MatchListExtractor,
    source: &LeagueSource,
) -> Vec<MatchSummary> {
    let page = match fetcher.fetch_page(source.url.as_str()).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %source.url, transient = e.is_transient(), "league page fetch failed: {e}");
            return Vec::new();
        }
    };

    let matches = extractor.extract_matches(&page.body_utf8, &page.url_final);
    info!(count = matches.len(), "matches listed");
    matches
}

/// Statistics for one match. No link means no request.
#[instrument(skip_all, fields(url = link.unwrap_or("-")))]
pub async fn match_stats(
    fetcher: &dyn PageSource,
    extractor: &dyn StatsExtractor,
    link: Option<&str>,
) -> MatchStats {
    let Some(url) = link else {
        return MatchStats::default();
    };

    match fetcher.fetch_page(url).await {
        Ok(page) => {
            let stats = extractor.extract_stats(&page.body_utf8);
            if stats.is_empty() {
                debug!("no statistics on detail page");
            }
            stats
        }
        Err(e) => {
            warn!(transient = e.is_transient(), "match page fetch failed: {e}");
            MatchStats::default()
        }
    }
}
