//! Turning a match and its statistics into the message that gets delivered.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::extractor::{MatchStats, MatchSummary};

/// Combined corners at or above this are a high-corner game.
pub const HIGH_CORNERS: u32 = 10;
/// Combined corners at or above this (and below `HIGH_CORNERS`) are moderate.
pub const MODERATE_CORNERS: u32 = 6;

/// Coarse corner bucket used to frame the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Low,
    Moderate,
    High,
}

impl Trend {
    /// Missing counts are treated as zero.
    pub fn from_corners(home: Option<u32>, away: Option<u32>) -> (Self, u32) {
        let total = home.unwrap_or(0).saturating_add(away.unwrap_or(0));
        let trend = if total >= HIGH_CORNERS {
            Self::High
        } else if total >= MODERATE_CORNERS {
            Self::Moderate
        } else {
            Self::Low
        };
        (trend, total)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// Language the report is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportLanguage {
    #[default]
    Portuguese,
    English,
}

impl FromStr for ReportLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pt" | "pt-br" | "portuguese" => Ok(Self::Portuguese),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unsupported report language '{other}'")),
        }
    }
}

struct Labels {
    score: &'static str,
    stats_header: &'static str,
    corners: &'static str,
    yellow: &'static str,
    shots: &'static str,
    home: &'static str,
    away: &'static str,
    unavailable: &'static str,
    trend: &'static str,
    trend_total: &'static str,
    updated: &'static str,
    disclaimer: &'static str,
    low: &'static str,
    moderate: &'static str,
    high: &'static str,
}

const PT: Labels = Labels {
    score: "Placar",
    stats_header: "Estatísticas (quando disponíveis)",
    corners: "Escanteios",
    yellow: "Cartões amarelos",
    shots: "Finalizações",
    home: "Casa",
    away: "Fora",
    unavailable: "N/D",
    trend: "Tendência de escanteios",
    trend_total: "total atual",
    updated: "Atualizado",
    disclaimer: "Este é um relatório analítico para estudo — não é recomendação de aposta.",
    low: "baixa",
    moderate: "moderada",
    high: "alta",
};

const EN: Labels = Labels {
    score: "Score",
    stats_header: "Statistics (when available)",
    corners: "Corners",
    yellow: "Yellow cards",
    shots: "Shots",
    home: "Home",
    away: "Away",
    unavailable: "n/a",
    trend: "Corner trend",
    trend_total: "current total",
    updated: "Updated",
    disclaimer: "This is an analytical report for study purposes — not betting advice.",
    low: "low",
    moderate: "moderate",
    high: "high",
};

impl ReportLanguage {
    fn labels(self) -> &'static Labels {
        match self {
            Self::Portuguese => &PT,
            Self::English => &EN,
        }
    }
}

/// A composed, ready to send message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub trend: Trend,
    pub total_corners: u32,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Compose with the current time as the generation stamp.
    pub fn now(summary: &MatchSummary, stats: &MatchStats, language: ReportLanguage) -> Self {
        compose(summary, stats, Utc::now(), language)
    }
}

/// Render the report as Telegram HTML. The same inputs always give the same
/// text; `generated_at` is the only moving part.
pub fn compose(
    summary: &MatchSummary,
    stats: &MatchStats,
    generated_at: DateTime<Utc>,
    language: ReportLanguage,
) -> Report {
    let l = language.labels();
    let (trend, total_corners) = Trend::from_corners(stats.corners_home, stats.corners_away);
    let value = |v: Option<u32>| v.map_or_else(|| l.unavailable.to_string(), |n| n.to_string());
    let trend_label = match trend {
        Trend::Low => l.low,
        Trend::Moderate => l.moderate,
        Trend::High => l.high,
    };

    let mut lines = vec![format!(
        "⚽ <b>{} x {}</b>",
        escape_html(&summary.home),
        escape_html(&summary.away)
    )];
    if !summary.status.is_empty() {
        lines.push(format!("⏱️ <i>{}</i>", escape_html(&summary.status)));
    }
    if !summary.score.is_empty() {
        lines.push(format!("🟢 {}: {}", l.score, escape_html(&summary.score)));
    }

    lines.push(String::new());
    lines.push(format!("📊 <b>{}</b>:", l.stats_header));
    for (label, home, away) in [
        (l.corners, stats.corners_home, stats.corners_away),
        (l.yellow, stats.yellow_home, stats.yellow_away),
        (l.shots, stats.shots_home, stats.shots_away),
    ] {
        lines.push(format!(
            "• {label} — {}: {} | {}: {}",
            l.home,
            value(home),
            l.away,
            value(away)
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "🔎 {}: <b>{trend_label}</b> ({}: {total_corners})",
        l.trend, l.trend_total
    ));
    lines.push(String::new());
    lines.push(format!(
        "🔁 {}: {}",
        l.updated,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(format!("ℹ️ {}", l.disclaimer));
    let text = lines.join("\n");

    Report {
        text,
        trend,
        total_corners,
        generated_at,
    }
}

/// Escape the three characters Telegram's HTML parse mode rejects.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
