//! Sport API feed: one match endpoint per sport plus a sport catalog.
//!
//! Endpoints (relative to the configured base URL):
//! - `GET /matches/{sport}[?date=YYYY-MM-DD]` → array of match records
//! - `GET /sports` → `[{ "name", "displayName" }]`
//!
//! Per-sport requests run concurrently. A failed sport contributes nothing;
//! the source only fails when every sport request failed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{http_client, parse_feed_document, FeedSource};
use crate::config::FeedConfig;
use crate::pipeline::normalize::Normalizer;
use crate::time::ZoneSpec;
use crate::types::{Match, MatchboardError, SportEntry};

pub struct SportApiFeed {
    http: Client,
    name: String,
    base_url: String,
    /// Sports to query; empty means "whatever the catalog lists".
    sports: Vec<String>,
    /// Zone whose calendar date is sent as `?date=`; `None` disables the filter.
    date_zone: Option<ZoneSpec>,
    normalizer: Normalizer,
}

impl SportApiFeed {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        sports: Vec<String>,
        date_zone: Option<ZoneSpec>,
        normalizer: Normalizer,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let name = name.into();
        let http = http_client(timeout)
            .with_context(|| format!("Failed to build HTTP client for feed {name}"))?;
        Ok(Self {
            http,
            name,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sports,
            date_zone,
            normalizer,
        })
    }

    pub fn from_config(cfg: &FeedConfig, viewer_zone: ZoneSpec) -> Result<Self> {
        Self::new(
            cfg.name.clone(),
            cfg.resolve_url()?,
            cfg.sports.clone(),
            cfg.date_filter.then_some(viewer_zone),
            Normalizer::new(cfg.naive_zone()?),
            cfg.request_timeout(),
        )
    }

    fn matches_url(&self, sport: &str) -> String {
        let mut url = format!("{}/matches/{}", self.base_url, urlencoding::encode(sport));
        if let Some(zone) = &self.date_zone {
            url.push_str(&format!("?date={}", zone.local_date(Utc::now()).format("%Y-%m-%d")));
        }
        url
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(feed = %self.name, url = %url, "Fetching sport API");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Feed {} request failed", self.name))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MatchboardError::HttpStatus {
                feed: self.name.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        resp.text()
            .await
            .with_context(|| format!("Failed to read feed {} body", self.name))
    }

    async fn fetch_sport(&self, sport: &str) -> Result<Vec<Match>> {
        let body = self.get_text(&self.matches_url(sport)).await?;
        let records = parse_feed_document(&body)
            .with_context(|| format!("Feed {} returned a malformed {sport} document", self.name))?;
        Ok(self.normalizer.normalize_all(&self.name, records))
    }

    /// Configured sports, or the catalog's when none are configured.
    async fn sports_to_query(&self) -> Vec<String> {
        if !self.sports.is_empty() {
            return self.sports.clone();
        }
        self.fetch_catalog()
            .await
            .unwrap_or_else(|e| {
                warn!(feed = %self.name, error = %e, "Sport catalog unavailable");
                Vec::new()
            })
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    }
}

#[async_trait]
impl FeedSource for SportApiFeed {
    async fn fetch_matches(&self) -> Result<Vec<Match>> {
        let sports = self.sports_to_query().await;
        if sports.is_empty() {
            info!(feed = %self.name, "No sports to query");
            return Ok(Vec::new());
        }

        let results = join_all(sports.iter().map(|sport| self.fetch_sport(sport))).await;

        let mut matches = Vec::new();
        let mut failures = 0usize;
        for (sport, result) in sports.iter().zip(results) {
            match result {
                Ok(mut batch) => {
                    debug!(feed = %self.name, sport = %sport, count = batch.len(), "Sport fetched");
                    matches.append(&mut batch);
                }
                Err(e) => {
                    failures += 1;
                    warn!(feed = %self.name, sport = %sport, error = %e, "Sport request failed, continuing without");
                }
            }
        }

        if failures == sports.len() {
            anyhow::bail!("Feed {}: all {} sport requests failed", self.name, failures);
        }

        info!(
            feed = %self.name,
            sports = sports.len(),
            failed = failures,
            matches = matches.len(),
            "Sport API feed fetched"
        );
        Ok(matches)
    }

    async fn fetch_catalog(&self) -> Result<Vec<SportEntry>> {
        let body = self.get_text(&format!("{}/sports", self.base_url)).await?;
        let catalog: Vec<SportEntry> = serde_json::from_str(&body)
            .map_err(|e| MatchboardError::Decode(e.to_string()))
            .with_context(|| format!("Failed to parse {} sport catalog", self.name))?;
        Ok(catalog)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(date_zone: Option<ZoneSpec>) -> SportApiFeed {
        SportApiFeed::new(
            "api",
            "http://127.0.0.1:1/v1/",
            vec!["football".into()],
            date_zone,
            Normalizer::default(),
            std::time::Duration::from_secs(2),
        )
        .unwrap()
    }

    #[test]
    fn test_matches_url_without_date() {
        assert_eq!(feed(None).matches_url("ice hockey"), "http://127.0.0.1:1/v1/matches/ice%20hockey");
    }

    #[test]
    fn test_matches_url_with_date() {
        let url = feed(Some(ZoneSpec::Utc)).matches_url("football");
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(url, format!("http://127.0.0.1:1/v1/matches/football?date={today}"));
    }

    #[tokio::test]
    async fn test_all_sports_failing_is_error() {
        assert!(feed(None).fetch_matches().await.is_err());
    }

    #[tokio::test]
    async fn test_catalog_failure_means_no_sports() {
        let mut f = feed(None);
        f.sports.clear();
        assert!(f.fetch_catalog().await.is_err());
        assert!(f.fetch_matches().await.unwrap().is_empty());
    }
}
