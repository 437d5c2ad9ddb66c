use std::fs;
use url::Url;

use crate::extractor::{
    KeywordStatsExtractor, ListingExtractor, MatchListExtractor, MatchStats, StatsExtractor,
};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn league_url() -> Url {
    Url::parse("https://www.flashscore.com.br/futebol/brasil/serie-a/").unwrap()
}

#[test]
fn test_extract_league_rows_in_page_order() {
    let html = fixture("league.html");
    let matches = ListingExtractor::default().extract_matches(&html, &league_url());

    let teams: Vec<(&str, &str)> = matches
        .iter()
        .map(|m| (m.home.as_str(), m.away.as_str()))
        .collect();
    assert_eq!(
        teams,
        vec![
            ("Flamengo", "Palmeiras"),
            ("São Paulo", "Grêmio"),
            ("Atlético-MG", "Botafogo"),
        ]
    );
}

#[test]
fn test_extract_live_row_details() {
    let html = fixture("league.html");
    let matches = ListingExtractor::default().extract_matches(&html, &league_url());

    let live = &matches[0];
    assert_eq!(live.score, "2-1");
    assert_eq!(live.status, "67'");
    assert_eq!(
        live.detail_link.as_deref(),
        Some("https://www.flashscore.com.br/jogo/futebol/AbCd1234/")
    );

    let scheduled = &matches[1];
    assert_eq!(scheduled.score, "");
    assert_eq!(scheduled.status, "19.10. 21:30");
    assert_eq!(
        scheduled.detail_link.as_deref(),
        Some("https://www.flashscore.com.br/jogo/futebol/EfGh5678/#/resumo-de-jogo")
    );

    let no_link = &matches[2];
    assert_eq!(no_link.detail_link, None);
    assert_eq!(no_link.status, "");
}

#[test]
fn test_row_with_one_participant_is_skipped() {
    let html = fixture("league.html");
    let matches = ListingExtractor::default().extract_matches(&html, &league_url());
    assert!(matches.iter().all(|m| m.home != "Cruzeiro"));
    assert_eq!(matches.len(), 3);
}

#[test]
fn test_page_without_rows_is_empty() {
    let html = fixture("match_empty.html");
    let matches = ListingExtractor::default().extract_matches(&html, &league_url());
    assert!(matches.is_empty());

    let matches = ListingExtractor::default().extract_matches("", &league_url());
    assert!(matches.is_empty());
}

#[test]
fn test_row_with_blank_participant_is_skipped() {
    let html = r#"<div class="event__match">
        <div class="event__participant">  </div>
        <div class="event__participant">Santos</div>
    </div>
    <div class="event__match">
        <div class="event__participant">Fortaleza</div>
        <div class="event__participant">Ceará</div>
    </div>"#;
    let matches = ListingExtractor::default().extract_matches(html, &league_url());
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].home, "Fortaleza");
}

#[test]
fn test_extract_portuguese_stats() {
    let html = fixture("match.html");
    let stats = KeywordStatsExtractor::default().extract_stats(&html);

    assert_eq!(
        stats,
        MatchStats {
            corners_home: Some(7),
            corners_away: Some(4),
            yellow_home: Some(2),
            yellow_away: Some(3),
            shots_home: Some(14),
            shots_away: Some(9),
        }
    );
}

#[test]
fn test_categories_are_independent() {
    let html = fixture("match_partial.html");
    let stats = KeywordStatsExtractor::default().extract_stats(&html);

    assert_eq!(stats.corners_home, Some(6));
    assert_eq!(stats.corners_away, Some(5));
    // only one number next to the label
    assert_eq!(stats.yellow_home, None);
    assert_eq!(stats.yellow_away, None);
    // no label at all
    assert_eq!(stats.shots_home, None);
    assert_eq!(stats.shots_away, None);
}

#[test]
fn test_cards_without_corners_still_extracted() {
    let html = "<html><body><div><span>Yellow cards</span> <span>3</span> <span>1</span></div></body></html>";
    let stats = KeywordStatsExtractor::default().extract_stats(html);
    assert_eq!(stats.yellow_home, Some(3));
    assert_eq!(stats.yellow_away, Some(1));
    assert_eq!(stats.corners_home, None);
}

#[test]
fn test_page_without_stats_is_default() {
    let html = fixture("match_empty.html");
    let stats = KeywordStatsExtractor::default().extract_stats(&html);
    assert_eq!(stats, MatchStats::default());
}

#[test]
fn test_malformed_html() {
    let html = "<html><body><div class=\"event__match\"><div class=\"event__participant\">Sport<div class=\"event__participant\">Náutico";
    // must not panic; whatever html5ever recovers is acceptable
    let _ = ListingExtractor::default().extract_matches(html, &league_url());
    let _ = KeywordStatsExtractor::default().extract_stats(html);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_listing_never_panics(html in ".*") {
            let _ = ListingExtractor::default().extract_matches(&html, &league_url());
        }

        #[test]
        fn test_listing_rows_always_have_two_teams(
            home in "[A-Za-z ]{0,12}",
            away in "[A-Za-z ]{0,12}",
        ) {
            let html = format!(
                r#"<div class="event__match"><div class="event__participant">{home}</div><div class="event__participant">{away}</div></div>"#
            );
            for m in ListingExtractor::default().extract_matches(&html, &league_url()) {
                prop_assert!(!m.home.is_empty());
                prop_assert!(!m.away.is_empty());
            }
        }

        #[test]
        fn test_stats_never_panic(html in ".*") {
            let _ = KeywordStatsExtractor::default().extract_stats(&html);
        }
    }
}
