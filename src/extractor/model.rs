use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// One row of a league listing. Both team names are always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub home: String,
    pub away: String,
    /// Live or final score as printed on the page, possibly empty.
    pub score: String,
    /// Kick-off time or match clock, possibly empty.
    pub status: String,
    pub detail_link: Option<String>,
}

/// Best-effort per-side counters. `None` means the page did not give us a
/// usable number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub corners_home: Option<u32>,
    pub corners_away: Option<u32>,
    pub yellow_home: Option<u32>,
    pub yellow_away: Option<u32>,
    pub shots_home: Option<u32>,
    pub shots_away: Option<u32>,
}

impl MatchStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Text of an element with every text node trimmed, empty nodes dropped and
/// the rest joined by `sep`.
pub fn element_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}
