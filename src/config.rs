//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Feed
//! URLs may be referenced by env-var name in the config (`url_env`) and are
//! resolved at runtime via `std::env::var`, so private mirrors stay out of
//! the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::pipeline::grouping::{
    PopularityTable, DEFAULT_FALLBACK_SPORT, DEFAULT_POPULAR_LEAGUES, DEFAULT_POPULAR_TEAMS,
    DEFAULT_SPORT_PRIORITY,
};
use crate::pipeline::relevance::{RelevanceRules, DEFAULT_STALE_NOT_STARTED_MINS};
use crate::pipeline::BoardRules;
use crate::time::ZoneSpec;
use crate::types::MatchboardError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSection,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Defines the viewer's "today". `"local"`, `"utc"`, `"+02:00"` or an
    /// IANA name.
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// One JSON document holding every match.
    Snapshot,
    /// Per-sport endpoints plus a sport catalog.
    SportApi,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub name: String,
    pub kind: FeedKind,
    /// Document URL (snapshot) or API base URL (sport_api).
    #[serde(default)]
    pub url: Option<String>,
    /// Env var holding the URL; overrides `url` when set.
    #[serde(default)]
    pub url_env: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Timezone for date text without a zone marker. Unset means UTC.
    #[serde(default)]
    pub naive_timezone: Option<String>,
    /// Sports to query (sport_api). Empty means "ask the catalog".
    #[serde(default)]
    pub sports: Vec<String>,
    /// Append `?date=YYYY-MM-DD` (viewer's today) to per-sport requests.
    #[serde(default)]
    pub date_filter: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelevanceConfig {
    #[serde(default = "default_stale_mins")]
    pub stale_not_started_mins: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GroupingConfig {
    #[serde(default = "default_sport_priority")]
    pub sport_priority: Vec<String>,
    #[serde(default = "default_fallback_sport")]
    pub fallback_sport: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    #[serde(default = "default_popular_leagues")]
    pub popular_leagues: Vec<String>,
    #[serde(default = "default_popular_teams")]
    pub popular_teams: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

// -- Defaults ----------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    60
}

fn default_display_timezone() -> String {
    "local".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_stale_mins() -> i64 {
    DEFAULT_STALE_NOT_STARTED_MINS
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_sport_priority() -> Vec<String> {
    to_strings(DEFAULT_SPORT_PRIORITY)
}

fn default_fallback_sport() -> String {
    DEFAULT_FALLBACK_SPORT.to_string()
}

fn default_popular_leagues() -> Vec<String> {
    to_strings(DEFAULT_POPULAR_LEAGUES)
}

fn default_popular_teams() -> Vec<String> {
    to_strings(DEFAULT_POPULAR_TEAMS)
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self { stale_not_started_mins: default_stale_mins() }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            sport_priority: default_sport_priority(),
            fallback_sport: default_fallback_sport(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            popular_leagues: default_popular_leagues(),
            popular_teams: default_popular_teams(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { enabled: true, port: 8080 }
    }
}

// ---------------------------------------------------------------------------
// Loading and derived settings
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    fn validate(&self) -> Result<(), MatchboardError> {
        if self.app.poll_interval_secs == 0 {
            return Err(MatchboardError::Config("poll_interval_secs must be positive".into()));
        }
        if self.relevance.stale_not_started_mins < 0 {
            return Err(MatchboardError::Config(
                "stale_not_started_mins must not be negative".into(),
            ));
        }
        self.display_zone()?;
        for feed in &self.feeds {
            feed.naive_zone()?;
            if feed.url.is_none() && feed.url_env.is_none() {
                return Err(MatchboardError::Config(format!(
                    "Feed {} needs `url` or `url_env`",
                    feed.name
                )));
            }
        }
        Ok(())
    }

    /// Zone that defines the viewer's calendar day.
    pub fn display_zone(&self) -> Result<ZoneSpec, MatchboardError> {
        self.app.display_timezone.parse()
    }

    pub fn enabled_feeds(&self) -> impl Iterator<Item = &FeedConfig> {
        self.feeds.iter().filter(|f| f.enabled)
    }

    /// Classification tunables assembled from the config sections.
    pub fn board_rules(&self) -> BoardRules {
        BoardRules {
            relevance: RelevanceRules {
                stale_not_started_after: chrono::Duration::minutes(
                    self.relevance.stale_not_started_mins,
                ),
            },
            sport_priority: self.grouping.sport_priority.clone(),
            fallback_sport: self.grouping.fallback_sport.clone(),
            popularity: PopularityTable {
                leagues: self.ranking.popular_leagues.clone(),
                teams: self.ranking.popular_teams.clone(),
            },
        }
    }
}

impl FeedConfig {
    pub fn naive_zone(&self) -> Result<ZoneSpec, MatchboardError> {
        match &self.naive_timezone {
            Some(tz) => tz.parse(),
            None => Ok(ZoneSpec::Utc),
        }
    }

    /// The URL from `url_env` when that variable is set, otherwise `url`.
    pub fn resolve_url(&self) -> Result<String> {
        if let Some(env) = &self.url_env {
            match AppConfig::resolve_env(env) {
                Ok(url) => return Ok(url),
                Err(e) if self.url.is_none() => return Err(e),
                Err(_) => {}
            }
        }
        self.url
            .clone()
            .with_context(|| format!("Feed {} has no URL", self.name))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
