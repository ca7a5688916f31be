//! Feed normalizer: heterogeneous raw records into canonical `Match`es.
//!
//! Two record shapes are seen in the wild:
//!
//! - camelCase: `date`, `timestamp`, `poster`, `streams[{url, quality}]`,
//!   `teams.home.logoUrl`, status/sport at the top level
//! - snake_case: `start_time`, `poster_url`, `resolved_streams[{label, url}]`,
//!   `teams.home.logo_url`, status/sport/currentMinute nested under `raw`
//!
//! Both deserialize into the permissive `RawMatch`; merging happens in
//! `Normalizer::normalize`.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::sport::resolve_sport;
use crate::time::{epoch_to_utc, parse_feed_date, ZoneSpec};
use crate::types::{Match, MatchboardError, Score, Stream, Team, Teams};

/// Status assumed when the feed sends none.
pub const DEFAULT_STATUS: &str = "NS";

const DEFAULT_STREAM_LANGUAGE: &str = "en";

// ---------------------------------------------------------------------------
// Raw record shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMatch {
    /// String or number.
    pub match_id: Option<Value>,
    pub title: Option<String>,
    pub poster: Option<String>,
    #[serde(rename = "poster_url")]
    pub poster_url: Option<String>,
    pub teams: Option<RawTeams>,
    pub score: Option<Value>,
    pub scores: Option<Value>,
    pub status: Option<String>,
    pub current_minute: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "start_time")]
    pub start_time: Option<String>,
    /// Epoch number (or numeric string), unit ambiguous.
    pub timestamp: Option<Value>,
    pub league: Option<String>,
    pub league_logo: Option<String>,
    pub sport: Option<String>,
    pub streams: Option<Vec<RawStream>>,
    #[serde(rename = "resolved_streams")]
    pub resolved_streams: Option<Vec<RawStream>>,
    pub raw: Option<RawExtras>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTeams {
    pub home: Option<RawTeam>,
    pub away: Option<RawTeam>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTeam {
    pub name: Option<String>,
    #[serde(rename = "logoUrl")]
    pub logo_url: Option<String>,
    #[serde(rename = "logo_url")]
    pub logo_url_snake: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawStream {
    pub id: Option<String>,
    pub url: Option<String>,
    pub quality: Option<String>,
    pub label: Option<String>,
    pub language: Option<String>,
}

/// Source-specific extras nested under `raw`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawExtras {
    pub status: Option<String>,
    pub sport: Option<String>,
    pub current_minute: Option<String>,
    pub league_logo: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Normalizes records from one feed. `naive_zone` is the timezone assumed
/// for date text that carries no zone marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    naive_zone: ZoneSpec,
}

impl Normalizer {
    pub fn new(naive_zone: ZoneSpec) -> Self {
        Self { naive_zone }
    }

    pub fn naive_zone(&self) -> ZoneSpec {
        self.naive_zone
    }

    /// Normalize one JSON record.
    pub fn normalize_value(&self, value: Value) -> Result<Match, MatchboardError> {
        let raw: RawMatch = serde_json::from_value(value)
            .map_err(|e| MatchboardError::InvalidRecord(e.to_string()))?;
        self.normalize(raw)
    }

    pub fn normalize(&self, raw: RawMatch) -> Result<Match, MatchboardError> {
        let match_id = raw
            .match_id
            .as_ref()
            .and_then(id_text)
            .ok_or(MatchboardError::MissingField("matchId"))?;

        let RawTeams { home, away } = raw.teams.ok_or(MatchboardError::MissingField("teams"))?;
        let home = team(home).ok_or(MatchboardError::MissingField("teams.home.name"))?;
        let away = team(away).ok_or(MatchboardError::MissingField("teams.away.name"))?;

        let extras = raw.raw.unwrap_or_default();
        let league = non_empty(raw.league).unwrap_or_default();
        let sport = resolve_sport(
            non_empty(raw.sport).or(non_empty(extras.sport)).as_deref(),
            &league,
        );

        let date = non_empty(raw.date).or(non_empty(raw.start_time));
        let kickoff = raw
            .timestamp
            .as_ref()
            .and_then(epoch_value)
            .or_else(|| date.as_deref().and_then(|d| parse_feed_date(d, &self.naive_zone)));

        let title = non_empty(raw.title).unwrap_or_else(|| format!("{} vs {}", home.name, away.name));

        let streams = raw
            .streams
            .or(raw.resolved_streams)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(i, s)| stream(i, s))
            .collect();

        Ok(Match {
            match_id,
            title,
            poster: non_empty(raw.poster).or(non_empty(raw.poster_url)),
            teams: Teams { home, away },
            scores: raw.scores.as_ref().or(raw.score.as_ref()).and_then(score),
            status: non_empty(raw.status)
                .or(non_empty(extras.status))
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            current_minute: non_empty(raw.current_minute).or(non_empty(extras.current_minute)),
            date,
            kickoff,
            league,
            league_logo: non_empty(raw.league_logo).or(non_empty(extras.league_logo)),
            sport,
            streams,
        })
    }

    /// Normalize a batch. Malformed records are logged and skipped.
    pub fn normalize_all(&self, feed: &str, records: Vec<Value>) -> Vec<Match> {
        let total = records.len();
        let matches: Vec<Match> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match self.normalize_value(value) {
                Ok(m) => Some(m),
                Err(e) => {
                    debug!(feed, index, error = %e, "Rejected feed record");
                    None
                }
            })
            .collect();

        if matches.len() < total {
            debug!(feed, total, accepted = matches.len(), "Feed records normalized with rejections");
        }
        matches
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn epoch_value(value: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    epoch_to_utc(number)
}

fn team(raw: Option<RawTeam>) -> Option<Team> {
    let raw = raw?;
    Some(Team {
        name: non_empty(raw.name)?,
        logo_url: non_empty(raw.logo_url).or(non_empty(raw.logo_url_snake)),
    })
}

fn score_side(value: Option<&Value>) -> Option<u32> {
    let value = value?;
    let n = value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<u64>().ok()))?;
    u32::try_from(n).ok()
}

fn score(value: &Value) -> Option<Score> {
    Some(Score {
        home: score_side(value.get("home"))?,
        away: score_side(value.get("away"))?,
    })
}

fn stream(index: usize, raw: RawStream) -> Option<Stream> {
    Some(Stream {
        url: non_empty(raw.url)?,
        id: non_empty(raw.id).unwrap_or_else(|| format!("stream-{index}")),
        quality: non_empty(raw.quality)
            .or(non_empty(raw.label))
            .unwrap_or_default(),
        language: non_empty(raw.language).unwrap_or_else(|| DEFAULT_STREAM_LANGUAGE.to_string()),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
