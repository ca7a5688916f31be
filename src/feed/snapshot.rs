//! Snapshot feed: a single JSON document listing every match.
//!
//! The document is either a bare array of records or `{ "matches": [...] }`.
//! Date text without a zone marker is read in the feed's configured
//! `naive_timezone` (the streameast mirror publishes US-Eastern wall-clock
//! times without an offset).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::{http_client, parse_feed_document, FeedSource};
use crate::config::FeedConfig;
use crate::pipeline::normalize::Normalizer;
use crate::types::{Match, MatchboardError};

pub struct SnapshotFeed {
    http: Client,
    name: String,
    url: String,
    normalizer: Normalizer,
}

impl SnapshotFeed {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        normalizer: Normalizer,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let name = name.into();
        let http = http_client(timeout)
            .with_context(|| format!("Failed to build HTTP client for feed {name}"))?;
        Ok(Self {
            http,
            name,
            url: url.into(),
            normalizer,
        })
    }

    pub fn from_config(cfg: &FeedConfig) -> Result<Self> {
        Self::new(
            cfg.name.clone(),
            cfg.resolve_url()?,
            Normalizer::new(cfg.naive_zone()?),
            cfg.request_timeout(),
        )
    }

    async fn fetch_document(&self) -> Result<String> {
        debug!(feed = %self.name, url = %self.url, "Fetching snapshot feed");

        let resp = self
            .http
            .get(&self.url)
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
}

#[async_trait]
impl FeedSource for SnapshotFeed {
    async fn fetch_matches(&self) -> Result<Vec<Match>> {
        let body = self.fetch_document().await?;
        let records = parse_feed_document(&body)
            .with_context(|| format!("Feed {} returned a malformed document", self.name))?;
        let total = records.len();
        let matches = self.normalizer.normalize_all(&self.name, records);

        info!(
            feed = %self.name,
            records = total,
            matches = matches.len(),
            "Snapshot feed fetched"
        );
        Ok(matches)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
