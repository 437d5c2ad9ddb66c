//! Turning page markup into match data.
//!
//! Both extraction steps sit behind a trait so a site redesign only means a
//! new implementation, not a new dispatcher.

pub mod listing;
pub mod model;
pub mod stats;

#[cfg(test)]
mod tests;

pub use listing::{ListingExtractor, ListingSelectors};
pub use model::{MatchStats, MatchSummary};
pub use stats::{KeywordStatsExtractor, StatCategory};

use url::Url;

/// Given a league listing page, produce its matches in page order.
///
/// Implementations never fail: rows they cannot read are skipped.
pub trait MatchListExtractor: Send + Sync {
    fn extract_matches(&self, html: &str, page_url: &Url) -> Vec<MatchSummary>;
}

/// Given a match detail page, produce whatever statistics it exposes.
pub trait StatsExtractor: Send + Sync {
    fn extract_stats(&self, html: &str) -> MatchStats;
}
