//! Time handling for feed data.
//!
//! Feeds send kick-off times either as an epoch number of ambiguous unit or
//! as ISO-ish text that may lack a timezone. Everything here converts those
//! into `DateTime<Utc>` and never fails loudly: an uninterpretable value is
//! `None`, which the relevance filter treats as "not worth showing".

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::types::MatchboardError;

/// Epoch values below this are seconds, at or above are milliseconds.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 10_000_000_000.0;

/// Naive formats tried in order when the date text has no zone marker.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-bearing formats tried after RFC 3339.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

static TRAILING_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d{2}:\d{2}$").unwrap());

// ---------------------------------------------------------------------------
// Zone specification
// ---------------------------------------------------------------------------

/// A timezone as written in configuration.
///
/// - `"utc"` / `"z"`
/// - `"local"` (system timezone)
/// - a fixed offset such as `"-05:00"` (no daylight saving)
/// - an IANA name such as `"America/New_York"` (daylight saving aware)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneSpec {
    Utc,
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Default for ZoneSpec {
    fn default() -> Self {
        ZoneSpec::Utc
    }
}

impl fmt::Display for ZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSpec::Utc => write!(f, "UTC"),
            ZoneSpec::Local => write!(f, "local"),
            ZoneSpec::Fixed(offset) => write!(f, "{offset}"),
            ZoneSpec::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

impl FromStr for ZoneSpec {
    type Err = MatchboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "utc" | "z" => return Ok(ZoneSpec::Utc),
            "local" => return Ok(ZoneSpec::Local),
            _ => {}
        }
        if let Some(offset) = parse_offset(s) {
            return Ok(ZoneSpec::Fixed(offset));
        }
        s.parse::<Tz>()
            .map(ZoneSpec::Named)
            .map_err(|_| MatchboardError::Config(format!("Unknown timezone: {s}")))
    }
}

impl ZoneSpec {
    /// Interpret a wall-clock time in this zone. Ambiguous times (DST fall
    /// back) resolve to the earlier instant; skipped times yield `None`.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            ZoneSpec::Utc => Some(naive.and_utc()),
            ZoneSpec::Local => chrono::Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|d| d.with_timezone(&Utc)),
            ZoneSpec::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|d| d.with_timezone(&Utc)),
            ZoneSpec::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|d| d.with_timezone(&Utc)),
        }
    }

    /// Calendar date of `now` in this zone.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            ZoneSpec::Utc => now.date_naive(),
            ZoneSpec::Local => now.with_timezone(&chrono::Local).date_naive(),
            ZoneSpec::Fixed(offset) => now.with_timezone(offset).date_naive(),
            ZoneSpec::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }

    /// First instant of `now`'s calendar day in this zone. Where a DST change
    /// skips midnight this is the first local time that exists that day.
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = self.local_date(now).and_time(NaiveTime::MIN);
        // Gaps are whole quarter hours and never longer than a few hours.
        (0..=4 * 4)
            .map(|q| midnight + chrono::Duration::minutes(15 * q))
            .find_map(|local| self.localize(local))
            .unwrap_or(now)
    }
}

/// Parse `+HH:MM` / `-HH:MM`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let sign = match s.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let (hours, minutes) = s[1..].split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// ---------------------------------------------------------------------------
// Feed timestamps
// ---------------------------------------------------------------------------

/// Convert an epoch number of ambiguous unit into an instant.
///
/// Non-finite or non-positive values are treated as absent.
pub fn epoch_to_utc(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let millis = if value < EPOCH_MILLIS_THRESHOLD {
        value * 1000.0
    } else {
        value
    };
    DateTime::<Utc>::from_timestamp_millis(millis.round() as i64)
}

/// Whether the date text carries its own timezone (`Z`, `+HH:MM`, `-HH:MM`).
pub fn has_zone_marker(text: &str) -> bool {
    let text = text.trim();
    text.contains(&['Z', 'z', '+'][..]) || TRAILING_OFFSET.is_match(text)
}

/// Parse feed date text. Text without a zone marker is read as wall-clock
/// time in `naive_zone`.
pub fn parse_feed_date(text: &str, naive_zone: &ZoneSpec) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if has_zone_marker(text) {
        return parse_zoned(text);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .and_then(|naive| naive_zone.localize(naive))
}

fn parse_zoned(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let normalized = match text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => text.to_string(),
    };

    ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// View context
// ---------------------------------------------------------------------------

/// The two instants every relevance decision depends on. Built once per
/// classification pass so the pipeline never reads a clock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContext {
    pub now: DateTime<Utc>,
    /// Start of the viewer's current calendar day.
    pub day_start: DateTime<Utc>,
}

impl ViewContext {
    pub fn new(now: DateTime<Utc>, viewer_zone: &ZoneSpec) -> Self {
        Self {
            now,
            day_start: viewer_zone.start_of_day(now),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
