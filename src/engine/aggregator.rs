//! Multi-feed aggregator.
//!
//! Fetches every configured feed concurrently, isolates failures (a failed
//! source contributes an empty list), and merges the results into one
//! snapshot in which `matchId` is unique. A live copy of a match replaces a
//! non-live one already taken from an earlier feed.

use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::feed::FeedSource;
use crate::pipeline::status::is_live;
use crate::types::{Match, SportEntry};

/// Per-source result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutcome {
    pub source: String,
    pub matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Merged snapshot plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub matches: Vec<Match>,
    pub sources: Vec<SourceOutcome>,
    /// Records dropped because an earlier source (or record) had the same id.
    pub duplicates: usize,
}

pub struct FeedAggregator {
    feeds: Vec<Box<dyn FeedSource>>,
}

impl FeedAggregator {
    pub fn new(feeds: Vec<Box<dyn FeedSource>>) -> Self {
        Self { feeds }
    }

    pub fn feed_names(&self) -> Vec<String> {
        self.feeds.iter().map(|f| f.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Fetch all feeds and merge. Never fails: broken sources are logged
    /// and recorded in `sources`.
    pub async fn fetch_all(&self) -> Aggregate {
        let results = join_all(self.feeds.iter().map(|f| f.fetch_matches())).await;

        let mut aggregate = Aggregate::default();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (feed, result) in self.feeds.iter().zip(results) {
            let source = feed.name();
            let batch = match result {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(source = %source, error = %e, "Feed fetch failed, continuing without");
                    aggregate.sources.push(SourceOutcome {
                        source,
                        matches: 0,
                        error: Some(format!("{e:#}")),
                    });
                    continue;
                }
            };

            let fetched = batch.len();
            for m in batch {
                aggregate.duplicates += match seen.get(&m.match_id).copied() {
                    None => {
                        seen.insert(m.match_id.clone(), aggregate.matches.len());
                        aggregate.matches.push(m);
                        0
                    }
                    Some(idx) if is_live(&m) && !is_live(&aggregate.matches[idx]) => {
                        debug!(source = %source, match_id = %m.match_id, "Live duplicate replaces earlier copy");
                        aggregate.matches[idx] = m;
                        1
                    }
                    Some(_) => {
                        debug!(source = %source, match_id = %m.match_id, "Duplicate match dropped");
                        1
                    }
                };
            }
            aggregate.sources.push(SourceOutcome { source, matches: fetched, error: None });
        }

        info!(
            sources = aggregate.sources.len(),
            failed = aggregate.sources.iter().filter(|s| !s.is_ok()).count(),
            matches = aggregate.matches.len(),
            duplicates = aggregate.duplicates,
            "Feeds aggregated"
        );
        aggregate
    }

    /// Union of every source's sport catalog, first occurrence of a name wins.
    pub async fn fetch_catalog(&self) -> Vec<SportEntry> {
        let results = join_all(self.feeds.iter().map(|f| f.fetch_catalog())).await;

        let mut seen: HashSet<String> = HashSet::new();
        let mut catalog = Vec::new();
        for (feed, result) in self.feeds.iter().zip(results) {
            let entries = result.unwrap_or_else(|e| {
                warn!(source = %feed.name(), error = %e, "Sport catalog fetch failed, continuing without");
                Vec::new()
            });
            for entry in entries {
                if seen.insert(entry.name.to_lowercase()) {
                    catalog.push(entry);
                }
            }
        }
        catalog
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
