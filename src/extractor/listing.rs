use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::extractor::{
    MatchListExtractor,
    model::{MatchSummary, element_text},
};

/// Class names that mark up one match row. The defaults follow the
/// FlashScore league pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    /// Substring of a `div`'s class attribute that marks a match row.
    pub row_class: String,
    pub participant: String,
    pub score: String,
    pub status: String,
    pub link: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            row_class: "event__match".to_string(),
            participant: "div.event__participant".to_string(),
            score: "div.event__scores".to_string(),
            status: "div.event__time".to_string(),
            link: "a.event__match--link".to_string(),
        }
    }
}

/// Class-driven listing parser.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    row_class: String,
    participant: Selector,
    score: Selector,
    status: Selector,
    link: Selector,
}

impl ListingExtractor {
    pub fn new(selectors: &ListingSelectors) -> Result<Self, String> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| format!("bad selector '{css}': {e:?}"))
        };
        Ok(Self {
            row_class: selectors.row_class.clone(),
            participant: parse(&selectors.participant)?,
            score: parse(&selectors.score)?,
            status: parse(&selectors.status)?,
            link: parse(&selectors.link)?,
        })
    }

    fn is_row(&self, element: &ElementRef<'_>) -> bool {
        element.value().name() == "div"
            && element
                .value()
                .attr("class")
                .is_some_and(|class| class.contains(&self.row_class))
    }

    fn parse_row(&self, row: ElementRef<'_>, page_url: &Url) -> Option<MatchSummary> {
        let mut participants = row.select(&self.participant);
        let home = element_text(participants.next()?, "");
        let away = element_text(participants.next()?, "");
        if home.is_empty() || away.is_empty() {
            return None;
        }

        let first_text = |sel: &Selector| {
            row.select(sel)
                .next()
                .map(|el| element_text(el, ""))
                .unwrap_or_default()
        };

        let detail_link = row
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_link(href, page_url));

        Some(MatchSummary {
            home,
            away,
            score: first_text(&self.score),
            status: first_text(&self.status),
            detail_link,
        })
    }
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new(&ListingSelectors::default()).expect("default listing selectors parse")
    }
}

impl MatchListExtractor for ListingExtractor {
    fn extract_matches(&self, html: &str, page_url: &Url) -> Vec<MatchSummary> {
        let document = Html::parse_document(html);

        let mut rows = 0usize;
        let matches: Vec<MatchSummary> = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| self.is_row(el))
            .inspect(|_| rows += 1)
            .filter_map(|row| self.parse_row(row, page_url))
            .collect();

        debug!(rows, matches = matches.len(), "listing parsed");
        matches
    }
}

/// Absolute hrefs pass through untouched; anything else is resolved against
/// the page it was found on.
pub fn resolve_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match Url::parse(href) {
        Ok(_) => Some(href.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            page_url.join(href).ok().map(String::from)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://www.flashscore.com.br/futebol/brasil/serie-a/").unwrap()
    }

    #[test]
    fn resolves_root_relative_links_against_origin() {
        assert_eq!(
            resolve_link("/jogo/futebol/abc123/", &page()).as_deref(),
            Some("https://www.flashscore.com.br/jogo/futebol/abc123/")
        );
    }

    #[test]
    fn absolute_links_pass_through() {
        let href = "https://other.example.com/match/9?tab=stats";
        assert_eq!(resolve_link(href, &page()).as_deref(), Some(href));
    }

    #[test]
    fn blank_href_has_no_link() {
        assert_eq!(resolve_link("   ", &page()), None);
    }

    #[test]
    fn custom_selectors() {
        let selectors = ListingSelectors {
            row_class: "fixture".to_string(),
            participant: "span.team".to_string(),
            score: "span.score".to_string(),
            status: "span.clock".to_string(),
            link: "a".to_string(),
        };
        let extractor = ListingExtractor::new(&selectors).unwrap();
        let html = r#"<div class="fixture live">
            <span class="team">Bahia</span><span class="team">Vitória</span>
            <span class="score">1-1</span><span class="clock">45'</span>
            <a href="/m/1">stats</a></div>"#;
        let matches = extractor.extract_matches(html, &page());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].home, "Bahia");
        assert_eq!(matches[0].away, "Vitória");
        assert_eq!(matches[0].score, "1-1");
        assert_eq!(matches[0].status, "45'");
        assert_eq!(
            matches[0].detail_link.as_deref(),
            Some("https://www.flashscore.com.br/m/1")
        );
    }

    #[test]
    fn invalid_selector_is_reported() {
        let selectors = ListingSelectors {
            participant: "div..".to_string(),
            ..ListingSelectors::default()
        };
        assert!(ListingExtractor::new(&selectors).is_err());
    }
}
