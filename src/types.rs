//! Shared types for MATCHBOARD.
//!
//! These types form the data model used across all modules: the canonical
//! `Match` produced by the feed normalizer, the status and sport taxonomies,
//! and the `Board` handed to the rendering layer.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// One side of a fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    pub home: Team,
    pub away: Team,
}

/// Current score, only present when the feed reports both sides numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// A playable stream attached to a match (embedded by the player).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub url: String,
    /// Quality or label as advertised by the feed ("HD", "720p", "Stream 2").
    pub quality: String,
    pub language: String,
}

/// A match in canonical form, rebuilt from scratch on every feed fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Sole correlation key between the live and upcoming partitions.
    pub match_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub teams: Teams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Score>,
    /// Free-text status code from the source feed ("NS", "FT", "45'", ...).
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_minute: Option<String>,
    /// Date text exactly as the feed sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Effective start instant: the epoch timestamp when present, otherwise
    /// the parsed `date`. `None` when neither could be interpreted.
    #[serde(default)]
    pub kickoff: Option<DateTime<Utc>>,
    pub league: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_logo: Option<String>,
    pub sport: String,
    #[serde(default)]
    pub streams: Vec<Stream>,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kickoff = self
            .kickoff
            .map(|k| k.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "undated".to_string());
        write!(
            f,
            "[{}] {} ({}) | {} | {}",
            self.sport, self.title, self.status, self.league, kickoff,
        )
    }
}

impl Match {
    /// Effective start time used by every temporal rule.
    pub fn effective_start(&self) -> Option<DateTime<Utc>> {
        self.kickoff
    }

    /// Whether either team name satisfies the predicate.
    pub fn any_team(&self, mut pred: impl FnMut(&str) -> bool) -> bool {
        pred(&self.teams.home.name) || pred(&self.teams.away.name)
    }

    /// Helper to build a test match with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: &str) -> Self {
        Match {
            match_id: id.to_string(),
            title: "Arsenal vs Chelsea".to_string(),
            poster: None,
            teams: Teams {
                home: Team { name: "Arsenal".to_string(), logo_url: None },
                away: Team { name: "Chelsea".to_string(), logo_url: None },
            },
            scores: None,
            status: "NS".to_string(),
            current_minute: None,
            date: None,
            kickoff: Some(Utc::now()),
            league: "Premier League".to_string(),
            league_logo: None,
            sport: "Football".to_string(),
            streams: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Heuristic status taxonomy derived from free-text feed status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    Live,
    Finished,
    NotStarted,
    /// Anything the vocabulary does not recognise; shown as upcoming.
    Unknown,
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Live => write!(f, "LIVE"),
            StatusClass::Finished => write!(f, "FINISHED"),
            StatusClass::NotStarted => write!(f, "NOT STARTED"),
            StatusClass::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Sport labels the league inferencer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SportCategory {
    Football,
    Basketball,
    AmericanFootball,
    Baseball,
    IceHockey,
    Tennis,
    Cricket,
    Mma,
    Golf,
}

impl SportCategory {
    /// All known categories (useful for iteration).
    pub const ALL: &'static [SportCategory] = &[
        SportCategory::Football,
        SportCategory::Basketball,
        SportCategory::AmericanFootball,
        SportCategory::Baseball,
        SportCategory::IceHockey,
        SportCategory::Tennis,
        SportCategory::Cricket,
        SportCategory::Mma,
        SportCategory::Golf,
    ];

    /// Display label, which is also the grouping key on the board.
    pub fn label(&self) -> &'static str {
        match self {
            SportCategory::Football => "Football",
            SportCategory::Basketball => "Basketball",
            SportCategory::AmericanFootball => "American Football",
            SportCategory::Baseball => "Baseball",
            SportCategory::IceHockey => "Ice Hockey",
            SportCategory::Tennis => "Tennis",
            SportCategory::Cricket => "Cricket",
            SportCategory::Mma => "MMA",
            SportCategory::Golf => "Golf",
        }
    }
}

impl fmt::Display for SportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parse a label back into a category (case-insensitive).
impl std::str::FromStr for SportCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SportCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown sport category: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Sport catalog
// ---------------------------------------------------------------------------

/// Navigation entry from the sport catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportEntry {
    pub name: String,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Board (output to the rendering layer)
// ---------------------------------------------------------------------------

/// One sport bucket in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SportGroup<T = Match> {
    pub sport: String,
    pub matches: Vec<T>,
}

/// Ordered sport → matches mapping. Serialises as a JSON object whose key
/// order is the display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SportGroups<T = Match> {
    groups: Vec<SportGroup<T>>,
}

impl<T> Default for SportGroups<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T> SportGroups<T> {
    /// Build from groups already in display order. Empty buckets are dropped.
    pub fn from_ordered(groups: Vec<SportGroup<T>>) -> Self {
        Self {
            groups: groups.into_iter().filter(|g| !g.matches.is_empty()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SportGroup<T>> {
        self.groups.iter()
    }

    /// Sport names in display order.
    pub fn sports(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.sport.as_str()).collect()
    }

    /// Look up a bucket by sport name, ignoring ASCII case (the rule buckets
    /// are formed by).
    pub fn get(&self, sport: &str) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|g| g.sport.eq_ignore_ascii_case(sport))
            .map(|g| g.matches.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of matches across every bucket.
    pub fn match_count(&self) -> usize {
        self.groups.iter().map(|g| g.matches.len()).sum()
    }

    /// Transform every match while keeping bucket order.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> SportGroups<U> {
        SportGroups {
            groups: self
                .groups
                .iter()
                .map(|g| SportGroup {
                    sport: g.sport.clone(),
                    matches: g.matches.iter().map(&mut f).collect(),
                })
                .collect(),
        }
    }
}

impl<T: Serialize> Serialize for SportGroups<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.sport, &group.matches)?;
        }
        map.end()
    }
}

/// Classified snapshot handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub generated_at: DateTime<Utc>,
    /// Live matches, most popular first.
    pub live_matches: Vec<Match>,
    /// Upcoming matches bucketed by sport, in display order.
    pub matches_by_sport: SportGroups,
}

impl Board {
    /// A board with nothing on it (before the first refresh).
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            live_matches: Vec::new(),
            matches_by_sport: SportGroups::default(),
        }
    }

    /// Find a match in either partition.
    pub fn find(&self, match_id: &str) -> Option<&Match> {
        self.live_matches
            .iter()
            .chain(self.matches_by_sport.iter().flat_map(|g| g.matches.iter()))
            .find(|m| m.match_id == match_id)
    }

    pub fn is_live(&self, match_id: &str) -> bool {
        self.live_matches.iter().any(|m| m.match_id == match_id)
    }

    pub fn total(&self) -> usize {
        self.live_matches.len() + self.matches_by_sport.match_count()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for MATCHBOARD.
#[derive(Debug, thiserror::Error)]
pub enum MatchboardError {
    #[error("Feed error ({feed}): {message}")]
    Feed { feed: String, message: String },

    #[error("Feed {feed} returned HTTP {status}")]
    HttpStatus { feed: String, status: u16 },

    #[error("Failed to decode feed document: {0}")]
    Decode(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
