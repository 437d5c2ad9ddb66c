use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::extractor::{
    StatsExtractor,
    model::{MatchStats, element_text},
};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Statistic groups the detail pages are searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatCategory {
    Corners,
    YellowCards,
    Shots,
}

impl StatCategory {
    pub const ALL: [StatCategory; 3] = [Self::Corners, Self::YellowCards, Self::Shots];

    /// Labels whose presence anywhere in the page makes the category worth
    /// searching.
    fn page_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Corners => &["Corners", "Escanteios"],
            Self::YellowCards => &["Yellow", "Amarelo"],
            Self::Shots => &["Shots", "Finaliza"],
        }
    }

    /// Labels that tie a single element to the category.
    fn element_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Corners => &["Corner", "Escanteio"],
            Self::YellowCards => &["Yellow", "Amarelo"],
            Self::Shots => &["Shots", "Finaliza"],
        }
    }

    fn slots(self, stats: &mut MatchStats) -> (&mut Option<u32>, &mut Option<u32>) {
        match self {
            Self::Corners => (&mut stats.corners_home, &mut stats.corners_away),
            Self::YellowCards => (&mut stats.yellow_home, &mut stats.yellow_away),
            Self::Shots => (&mut stats.shots_home, &mut stats.shots_away),
        }
    }
}

/// Keyword search over the detail page in English and Portuguese.
///
/// The page layout is not stable, so nothing here relies on class names:
/// any `div`, `tr` or `span` whose text mentions a category label is a
/// candidate, and the last candidate in document order that carries two
/// numbers wins.
#[derive(Debug, Clone)]
pub struct KeywordStatsExtractor {
    candidates: Selector,
}

impl Default for KeywordStatsExtractor {
    fn default() -> Self {
        Self {
            candidates: Selector::parse("div, tr, span").unwrap(),
        }
    }
}

impl StatsExtractor for KeywordStatsExtractor {
    fn extract_stats(&self, html: &str) -> MatchStats {
        let document = Html::parse_document(html);
        let flat = element_text(document.root_element(), "|");

        let wanted: Vec<StatCategory> = StatCategory::ALL
            .into_iter()
            .filter(|c| c.page_keywords().iter().any(|k| flat.contains(k)))
            .collect();

        let mut stats = MatchStats::default();
        if wanted.is_empty() {
            debug!("no statistic labels on page");
            return stats;
        }

        for element in document.select(&self.candidates) {
            let text = element_text(element, " ");
            for category in &wanted {
                if !category.element_keywords().iter().any(|k| text.contains(k)) {
                    continue;
                }
                if let Some((home, away)) = assign_first_two(&text) {
                    let (home_slot, away_slot) = category.slots(&mut stats);
                    *home_slot = Some(home);
                    *away_slot = Some(away);
                }
            }
        }

        stats
    }
}

/// First number in `text` is taken as the home value, second as the away
/// value. Extra numbers are ignored, so a label like "Shots on target 2nd
/// half" can skew the result. Returns `None` with fewer than two numbers or
/// when one of the first two does not fit a `u32`.
pub fn assign_first_two(text: &str) -> Option<(u32, u32)> {
    let mut numbers = NUMBER.find_iter(text).map(|m| m.as_str().parse::<u32>());
    let home = numbers.next()?.ok()?;
    let away = numbers.next()?.ok()?;
    Some((home, away))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_two_numbers_are_home_and_away() {
        assert_eq!(assign_first_two("5 Escanteios 3"), Some((5, 3)));
        assert_eq!(assign_first_two("Corner kicks 7 2 (1st half 4)"), Some((7, 2)));
    }

    #[test]
    fn shortfall_leaves_nothing() {
        assert_eq!(assign_first_two("Corners 4"), None);
        assert_eq!(assign_first_two("Corners"), None);
        assert_eq!(assign_first_two("Corners 99999999999 1"), None);
    }

    #[test]
    fn incidental_digits_are_not_filtered() {
        // weak spot of the heuristic: the "2" in the label is taken as home
        assert_eq!(assign_first_two("Shots 2nd half 6 4"), Some((2, 6)));
    }

    #[test]
    fn innermost_row_wins_over_wrapper() {
        let html = r#"<html><body><div>
            <div class="row"><span>4</span><span>Escanteios</span><span>6</span></div>
            <div class="row"><span>1</span><span>Cartões Amarelos</span><span>2</span></div>
        </div></body></html>"#;
        let stats = KeywordStatsExtractor::default().extract_stats(html);
        assert_eq!(stats.corners_home, Some(4));
        assert_eq!(stats.corners_away, Some(6));
        assert_eq!(stats.yellow_home, Some(1));
        assert_eq!(stats.yellow_away, Some(2));
        assert_eq!(stats.shots_home, None);
        assert_eq!(stats.shots_away, None);
    }

    #[test]
    fn category_needs_its_page_keyword() {
        // "Corner" alone (singular) is not enough to search for corners
        let html = "<div>Corner flag 1 2</div>";
        let stats = KeywordStatsExtractor::default().extract_stats(html);
        assert!(stats.is_empty());
    }
}
