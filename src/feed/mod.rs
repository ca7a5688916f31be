//! Feed sources.
//!
//! Defines the `FeedSource` trait and the two HTTP-backed implementations:
//! - `SnapshotFeed`: one JSON document holding every match
//! - `SportApiFeed`: per-sport match endpoints plus a sport catalog

pub mod snapshot;
pub mod sport_api;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::{FeedConfig, FeedKind};
use crate::time::ZoneSpec;
use crate::types::{Match, MatchboardError, SportEntry};

pub use snapshot::SnapshotFeed;
pub use sport_api::SportApiFeed;

/// Abstraction over external match feeds.
///
/// Implementors return matches already normalized into canonical form.
/// Per-record malformation is absorbed inside `fetch_matches`; an `Err`
/// means the whole source failed for this cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and normalize the current snapshot from this source.
    async fn fetch_matches(&self) -> Result<Vec<Match>>;

    /// Sport catalog for navigation. Sources without one return nothing.
    async fn fetch_catalog(&self) -> Result<Vec<SportEntry>> {
        Ok(Vec::new())
    }

    /// Source name for logging and identification.
    fn name(&self) -> String;
}

/// Extract the raw records from a feed document: either a bare array or an
/// object with a `matches` array. An object without `matches` is empty.
pub fn parse_feed_document(body: &str) -> Result<Vec<Value>, MatchboardError> {
    let doc: Value =
        serde_json::from_str(body).map_err(|e| MatchboardError::Decode(e.to_string()))?;
    match doc {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("matches") {
            Some(Value::Array(records)) => Ok(records),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(MatchboardError::Decode(format!(
                "`matches` is not an array: {other}"
            ))),
        },
        other => Err(MatchboardError::Decode(format!(
            "expected an array or an object, got {other}"
        ))),
    }
}

/// Build one source per enabled feed. `viewer_zone` supplies "today" for
/// date-filtered sport API requests.
pub fn build_feeds(feeds: &[FeedConfig], viewer_zone: ZoneSpec) -> Result<Vec<Box<dyn FeedSource>>> {
    let mut sources: Vec<Box<dyn FeedSource>> = Vec::new();
    for cfg in feeds.iter().filter(|f| f.enabled) {
        let source: Box<dyn FeedSource> = match cfg.kind {
            FeedKind::Snapshot => Box::new(SnapshotFeed::from_config(cfg)?),
            FeedKind::SportApi => Box::new(SportApiFeed::from_config(cfg, viewer_zone)?),
        };
        sources.push(source);
    }
    Ok(sources)
}

/// Shared HTTP client settings for feed sources.
fn http_client(timeout: std::time::Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("matchboard/", env!("CARGO_PKG_VERSION")))
        .build()
}
