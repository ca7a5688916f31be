//! In-memory feed for integration testing.
//!
//! Returns a fixed set of matches (or a forced error) with no network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use matchboard::feed::FeedSource;
use matchboard::types::{Match, SportEntry};

/// A deterministic `FeedSource` whose snapshot and failure mode are
/// controllable from test code.
pub struct StaticFeed {
    name: String,
    matches: Arc<Mutex<Vec<Match>>>,
    catalog: Vec<SportEntry>,
    /// If set, `fetch_matches` returns this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl StaticFeed {
    pub fn new(name: &str, matches: Vec<Match>) -> Self {
        Self {
            name: name.to_string(),
            matches: Arc::new(Mutex::new(matches)),
            catalog: Vec::new(),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<SportEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Handle for swapping the snapshot after the feed has been boxed.
    pub fn snapshot_handle(&self) -> Arc<Mutex<Vec<Match>>> {
        self.matches.clone()
    }

    /// Handle for forcing errors after the feed has been boxed.
    pub fn error_handle(&self) -> Arc<Mutex<Option<String>>> {
        self.force_error.clone()
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_matches(&self) -> Result<Vec<Match>> {
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        Ok(self.matches.lock().unwrap().clone())
    }

    async fn fetch_catalog(&self) -> Result<Vec<SportEntry>> {
        Ok(self.catalog.clone())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
