use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use matchscout::{
    config::LeagueSource,
    delivery::{Deliverer, DeliveryError, Notifier},
    dispatcher::{DispatchConfig, Dispatcher},
    fetcher::{FetchError, PageResponse, PageSource},
};

const LEAGUE: &str = "https://www.flashscore.com.br/futebol/brasil/serie-a/";
const MATCH: &str = "https://www.flashscore.com.br/jogo/futebol/AbCd1234/";

/// Serves canned pages and counts requests per URL.
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    hits: Mutex<Vec<String>>,
}

impl FakeSite {
    fn with(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageSource for FakeSite {
    async fn fetch_page(&self, url: &str) -> Result<PageResponse, FetchError> {
        self.hits.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(PageResponse::from_html(Url::parse(url)?, html.clone())),
            None => Err(FetchError::Http {
                status: reqwest::StatusCode::NOT_FOUND,
                transient: false,
            }),
        }
    }
}

/// Keeps every delivered text; panics on the calls listed in `panic_on`.
#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<String>>,
    calls: AtomicUsize,
    panic_on: Vec<usize>,
}

impl Outbox {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Deliverer for Outbox {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on.contains(&call) {
            panic!("deliverer blew up on call {call}");
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn league_html() -> String {
    r#"<html><body>
        <div class="event__match event__match--live">
          <a class="event__match--link" href="/jogo/futebol/AbCd1234/"></a>
          <div class="event__time">80'</div>
          <div class="event__participant">Flamengo</div>
          <div class="event__participant">Palmeiras</div>
          <div class="event__scores"><span>2</span>-<span>1</span></div>
        </div>
        </body></html>"#
        .to_string()
}

const MATCH_HTML: &str = r#"<html><body>
  <div class="stat"><div>6</div><div>Escanteios</div><div>5</div></div>
  <div class="stat"><div>1</div><div>Cartões Amarelos</div><div>4</div></div>
</body></html>"#;

fn config() -> DispatchConfig {
    DispatchConfig {
        sources: vec![LeagueSource::new("Brasileirão Série A", Url::parse(LEAGUE).unwrap())],
        ..DispatchConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn detail_statistics_reach_the_report() {
    let site = Arc::new(FakeSite::default().with(LEAGUE, &league_html()).with(MATCH, MATCH_HTML));
    let outbox = Arc::new(Outbox::default());

    let dispatcher = Dispatcher::new(config(), site.clone(), outbox.clone());
    let summary = dispatcher.run_cycle().await;

    assert_eq!(summary.reports_delivered, 1);
    assert_eq!(site.hits(MATCH), 1);

    let sent = outbox.sent();
    let report = &sent[0];
    assert!(report.starts_with("⚽ <b>Flamengo x Palmeiras</b>"));
    assert!(report.contains("<i>80'</i>"));
    assert!(report.contains("Placar: 2-1"));
    assert!(report.contains("• Escanteios — Casa: 6 | Fora: 5"));
    assert!(report.contains("• Cartões amarelos — Casa: 1 | Fora: 4"));
    assert!(report.contains("• Finalizações — Casa: N/D | Fora: N/D"));
    assert!(report.contains("<b>alta</b> (total atual: 11)"));
}

#[tokio::test(start_paused = true)]
async fn per_source_cap_bounds_deliveries() {
    let rows: String = (0..12)
        .map(|i| {
            format!(
                r#"<div class="event__match"><div class="event__participant">Home {i}</div><div class="event__participant">Away {i}</div></div>"#
            )
        })
        .collect();
    let site = Arc::new(FakeSite::default().with(LEAGUE, &rows));
    let outbox = Arc::new(Outbox::default());

    let dispatcher = Dispatcher::new(config(), site, outbox.clone());
    let summary = dispatcher.run_cycle().await;

    assert_eq!(summary.matches_found, 12);
    assert_eq!(summary.reports_delivered, 8);
    let sent = outbox.sent();
    assert!(sent[0].contains("Home 0 x Away 0"));
    assert!(sent[7].contains("Home 7 x Away 7"));
}

#[tokio::test(start_paused = true)]
async fn loop_repeats_until_cancelled() {
    let site = Arc::new(FakeSite::default().with(LEAGUE, &league_html()).with(MATCH, MATCH_HTML));
    let outbox = Arc::new(Outbox::default());
    let dispatcher = Arc::new(Dispatcher::new(config(), site.clone(), outbox.clone()));

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(dispatcher.run(shutdown.clone()));

    // first cycle at t=0, second after the 300s idle period
    tokio::time::sleep(Duration::from_secs(310)).await;
    shutdown.cancel();
    handle.await.unwrap();

    assert_eq!(outbox.sent().len(), 2);
    assert_eq!(site.hits(LEAGUE), 2);
}

#[tokio::test(start_paused = true)]
async fn panicking_cycle_is_abandoned_not_fatal() {
    let site = Arc::new(FakeSite::default().with(LEAGUE, &league_html()));
    let outbox = Arc::new(Outbox {
        panic_on: vec![0],
        ..Outbox::default()
    });
    let dispatcher = Arc::new(Dispatcher::new(config(), site.clone(), outbox.clone()));

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(dispatcher.run(shutdown.clone()));

    tokio::time::sleep(Duration::from_secs(305)).await;
    shutdown.cancel();
    handle.await.unwrap();

    // cycle one panicked inside the deliverer, cycle two went through
    assert_eq!(outbox.calls.load(Ordering::SeqCst), 2);
    assert_eq!(outbox.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_credentials_still_complete_the_cycle() {
    let site = Arc::new(FakeSite::default().with(LEAGUE, &league_html()));
    let notifier = Arc::new(Notifier::from_config(None).unwrap());
    assert!(!notifier.is_enabled());

    let dispatcher = Dispatcher::new(config(), site, notifier);
    let summary = dispatcher.run_cycle().await;

    assert_eq!(summary.reports_composed, 1);
    assert_eq!(summary.delivery_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_idle_stops_promptly() {
    let site = Arc::new(FakeSite::default());
    let outbox = Arc::new(Outbox::default());
    let dispatcher = Arc::new(Dispatcher::new(config(), site.clone(), outbox));

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(dispatcher.run(shutdown.clone()));

    tokio::time::sleep(Duration::from_secs(1)).await;
    let cancelled_at = tokio::time::Instant::now();
    shutdown.cancel();
    handle.await.unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_secs(1));
    assert_eq!(site.hits(LEAGUE), 1);
}
