//! Sport inference from league names.
//!
//! Feeds frequently omit the sport. Leagues never belong to two categories
//! in practice, so a first-match keyword table is enough.

use crate::types::SportCategory;

struct SportKeywords {
    sport: SportCategory,
    keywords: &'static [&'static str],
}

/// Evaluated top to bottom; anything unmatched is Football.
const SPORT_KEYWORDS: &[SportKeywords] = &[
    SportKeywords {
        sport: SportCategory::Basketball,
        keywords: &["nba", "basketball", "euroleague", "fiba"],
    },
    SportKeywords {
        sport: SportCategory::AmericanFootball,
        keywords: &["nfl", "ncaaf"],
    },
    SportKeywords {
        sport: SportCategory::Baseball,
        keywords: &["mlb", "baseball"],
    },
    SportKeywords {
        sport: SportCategory::IceHockey,
        keywords: &["nhl", "hockey"],
    },
    SportKeywords {
        sport: SportCategory::Tennis,
        keywords: &[
            "tennis",
            "atp",
            "wta",
            "australian open",
            "wimbledon",
            "french open",
            "us open",
        ],
    },
    SportKeywords {
        sport: SportCategory::Cricket,
        keywords: &["cricket", "ipl", "bbl", "psl"],
    },
    SportKeywords {
        sport: SportCategory::Mma,
        keywords: &["ufc", "mma", "bellator"],
    },
    SportKeywords {
        sport: SportCategory::Golf,
        keywords: &["golf", "pga", "masters"],
    },
];

/// Infer a sport from a league name (case-insensitive substring match).
pub fn infer_sport(league: &str) -> SportCategory {
    let league = league.to_lowercase();
    SPORT_KEYWORDS
        .iter()
        .find(|sk| sk.keywords.iter().any(|kw| league.contains(kw)))
        .map(|sk| sk.sport)
        .unwrap_or(SportCategory::Football)
}

/// Feed-provided sport when non-empty, otherwise the inferred label. Feed
/// values naming a known category are rewritten to its label ("football" →
/// "Football").
pub fn resolve_sport(feed_sport: Option<&str>, league: &str) -> String {
    match feed_sport.map(str::trim).filter(|s| !s.is_empty()) {
        Some(sport) => match sport.parse::<SportCategory>() {
            Ok(category) => category.label().to_string(),
            Err(_) => sport.to_string(),
        },
        None => infer_sport(league).label().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
