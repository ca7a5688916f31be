//! Display ordering: popularity ranking for live matches and sport
//! bucketing for upcoming ones.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use crate::types::{Match, SportGroup, SportGroups};

/// Buckets shown first, in this order. Everything else follows alphabetically.
pub const DEFAULT_SPORT_PRIORITY: &[&str] = &[
    "Football",
    "Basketball",
    "American Football",
    "Ice Hockey",
    "Baseball",
    "Tennis",
    "Cricket",
    "MMA",
    "Golf",
];

pub const DEFAULT_FALLBACK_SPORT: &str = "Other";

pub const DEFAULT_POPULAR_LEAGUES: &[&str] = &[
    "Premier League",
    "La Liga",
    "Serie A",
    "Bundesliga",
    "UEFA Champions League",
    "UEFA Europa League",
    "NBA",
    "EuroLeague",
    "NFL",
    "MLB",
    "NHL",
    "Indian Super League",
    "Champions League",
    "ISL",
    "FIFA Arab Cup",
];

pub const DEFAULT_POPULAR_TEAMS: &[&str] = &[
    "Real Madrid",
    "Barcelona",
    "Manchester United",
    "Manchester City",
    "Liverpool",
    "Chelsea",
    "Arsenal",
    "Bayern Munich",
    "PSG",
    "Juventus",
    "AC Milan",
    "Inter Milan",
    "Atletico Madrid",
    "Borussia Dortmund",
    "Tottenham",
    "Ajax",
    "Benfica",
    "Porto",
    "Napoli",
    "Roma",
    "Lazio",
    "Sevilla",
    "Valencia",
    "Lakers",
    "Warriors",
    "Celtics",
    "Heat",
    "Bucks",
    "Nets",
    "Clippers",
    "Mavericks",
    "India",
    "Pakistan",
    "England",
    "Australia",
    "South Africa",
    "New Zealand",
    "West Indies",
    "Sri Lanka",
];

// ---------------------------------------------------------------------------
// Popularity
// ---------------------------------------------------------------------------

/// Curated league and team lists used to rank live matches.
///
/// Matching is a case-sensitive substring test: `"Premier League"` matches
/// `"English Premier League"` but not `"premier league"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularityTable {
    pub leagues: Vec<String>,
    pub teams: Vec<String>,
}

impl Default for PopularityTable {
    fn default() -> Self {
        Self {
            leagues: DEFAULT_POPULAR_LEAGUES.iter().map(|s| s.to_string()).collect(),
            teams: DEFAULT_POPULAR_TEAMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PopularityTable {
    pub fn is_popular_league(&self, league: &str) -> bool {
        self.leagues.iter().any(|l| league.contains(l.as_str()))
    }

    pub fn has_popular_team(&self, m: &Match) -> bool {
        m.any_team(|name| self.teams.iter().any(|t| name.contains(t.as_str())))
    }

    /// 3 = popular league and team, 2 = team only, 1 = league only, 0 = neither.
    pub fn score(&self, m: &Match) -> u8 {
        2 * u8::from(self.has_popular_team(m)) + u8::from(self.is_popular_league(&m.league))
    }
}

/// Sort live matches by descending popularity. Stable, so equal scores keep
/// feed order.
pub fn rank_live(mut matches: Vec<Match>, table: &PopularityTable) -> Vec<Match> {
    matches.sort_by_cached_key(|m| Reverse(table.score(m)));
    matches
}

// ---------------------------------------------------------------------------
// Sport buckets
// ---------------------------------------------------------------------------

/// Order two sports for display: priority list first, then alphabetical.
/// Sport names are ASCII in practice, so "alphabetical" is a lowercase
/// comparison with the raw string as tie-break; no locale collation.
fn compare_sports(a: &str, b: &str, priority: &[String]) -> Ordering {
    let rank = |s: &str| priority.iter().position(|p| p.eq_ignore_ascii_case(s));
    match (rank(a), rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
    }
}

/// Bucket upcoming matches by sport. Sport names are matched ignoring ASCII
/// case, the same rule `SportGroups::get` uses; a bucket is labelled with the
/// first spelling seen. Each bucket is sorted by kickoff ascending (stable);
/// undated entries sink to the end.
pub fn group_upcoming(matches: Vec<Match>, priority: &[String], fallback_sport: &str) -> SportGroups {
    let mut buckets: HashMap<String, SportGroup> = HashMap::new();
    for m in matches {
        let sport = match m.sport.trim() {
            "" => fallback_sport.to_string(),
            sport => sport.to_string(),
        };
        buckets
            .entry(sport.to_ascii_lowercase())
            .or_insert_with(|| SportGroup { sport, matches: Vec::new() })
            .matches
            .push(m);
    }

    let mut groups: Vec<SportGroup> = buckets.into_values().collect();
    groups.sort_by(|a, b| compare_sports(&a.sport, &b.sport, priority));
    for group in &mut groups {
        group
            .matches
            .sort_by_key(|m| (m.effective_start().is_none(), m.effective_start()));
    }

    SportGroups::from_ordered(groups)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
