//! One refresh cycle: aggregate feeds → classify → publish.
//!
//! The published board is replaced wholesale; readers never observe a
//! half-built snapshot. The sport catalog changes rarely and is refetched
//! at most once per `catalog_ttl`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use super::aggregator::{FeedAggregator, SourceOutcome};
use crate::dashboard::routes::AppState;
use crate::pipeline::{assemble, partition, BoardRules};
use crate::time::{ViewContext, ZoneSpec};

/// Default catalog refetch interval.
pub const DEFAULT_CATALOG_TTL_MINS: i64 = 60;

/// Summary of one refresh, served on `/api/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub cycle: u64,
    pub refreshed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub sources: Vec<SourceOutcome>,
    pub fetched: usize,
    pub duplicates: usize,
    pub live: usize,
    pub upcoming: usize,
    pub excluded: usize,
    /// Exclusion reason → count.
    pub excluded_by_reason: BTreeMap<String, usize>,
    pub sports: Vec<String>,
}

pub struct Refresher {
    aggregator: FeedAggregator,
    rules: BoardRules,
    viewer_zone: ZoneSpec,
    state: AppState,
    catalog_ttl: Duration,
    catalog_fetched_at: Option<DateTime<Utc>>,
    cycle: u64,
}

impl Refresher {
    pub fn new(aggregator: FeedAggregator, rules: BoardRules, viewer_zone: ZoneSpec, state: AppState) -> Self {
        Self {
            aggregator,
            rules,
            viewer_zone,
            state,
            catalog_ttl: Duration::minutes(DEFAULT_CATALOG_TTL_MINS),
            catalog_fetched_at: None,
            cycle: 0,
        }
    }

    pub fn with_catalog_ttl(mut self, ttl: Duration) -> Self {
        self.catalog_ttl = ttl;
        self
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycle
    }

    /// Run one cycle as of `now`. Never fails: source errors end up in the
    /// report and an empty contribution.
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> RefreshReport {
        let started = Instant::now();
        self.cycle += 1;

        let aggregate = self.aggregator.fetch_all().await;
        let ctx = ViewContext::new(now, &self.viewer_zone);
        let split = partition(&aggregate.matches, &ctx, &self.rules);

        let mut excluded_by_reason: BTreeMap<String, usize> = BTreeMap::new();
        for (match_id, reason) in &split.excluded {
            debug!(match_id = %match_id, reason = %reason, "Match excluded");
            *excluded_by_reason.entry(reason.to_string()).or_default() += 1;
        }
        let excluded = split.excluded.len();

        let board = assemble(split, &ctx, &self.rules);
        let live = board.live_matches.len();
        let upcoming = board.matches_by_sport.match_count();
        let sports = board.matches_by_sport.sports().iter().map(|s| s.to_string()).collect();

        *self.state.board.write().await = board;

        if self.catalog_due(now) {
            let catalog = self.aggregator.fetch_catalog().await;
            info!(entries = catalog.len(), "Sport catalog refreshed");
            *self.state.catalog.write().await = catalog;
            self.catalog_fetched_at = Some(now);
        }

        let report = RefreshReport {
            cycle: self.cycle,
            refreshed_at: now,
            duration_ms: started.elapsed().as_millis() as u64,
            sources: aggregate.sources,
            fetched: aggregate.matches.len(),
            duplicates: aggregate.duplicates,
            live,
            upcoming,
            excluded,
            excluded_by_reason,
            sports,
        };

        info!(
            cycle = report.cycle,
            fetched = report.fetched,
            live = report.live,
            upcoming = report.upcoming,
            excluded = report.excluded,
            duration_ms = report.duration_ms,
            "Board refreshed"
        );

        *self.state.last_report.write().await = Some(report.clone());
        report
    }

    fn catalog_due(&self, now: DateTime<Utc>) -> bool {
        match self.catalog_fetched_at {
            None => true,
            Some(at) => now - at >= self.catalog_ttl,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::routes::DashboardState;
    use crate::feed::{FeedSource, MockFeedSource};
    use crate::types::{Match, SportEntry};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
    }

    fn at(id: &str, status: &str, offset_mins: i64) -> Match {
        let mut m = Match::sample(id);
        m.status = status.to_string();
        m.kickoff = Some(now() + Duration::minutes(offset_mins));
        m
    }

    fn feed(matches: Vec<Match>, catalog_calls: usize) -> Box<dyn FeedSource> {
        let mut feed = MockFeedSource::new();
        feed.expect_name().return_const("mock".to_string());
        feed.expect_fetch_matches().returning(move || Ok(matches.clone()));
        feed.expect_fetch_catalog().times(catalog_calls).returning(|| {
            Ok(vec![SportEntry { name: "football".into(), display_name: "Football".into() }])
        });
        Box::new(feed)
    }

    #[tokio::test]
    async fn test_refresh_publishes_board_and_report() {
        let state: AppState = Arc::new(DashboardState::new("test"));
        let snapshot = vec![
            at("live", "45'", -45),
            at("next", "NS", 60),
            at("done", "FT", -120),
            at("stale", "NS", -200),
        ];
        let mut refresher = Refresher::new(
            FeedAggregator::new(vec![feed(snapshot, 1)]),
            BoardRules::default(),
            ZoneSpec::Utc,
            state.clone(),
        );

        let report = refresher.refresh(now()).await;
        assert_eq!(report.cycle, 1);
        assert_eq!((report.fetched, report.live, report.upcoming, report.excluded), (4, 1, 1, 2));
        assert_eq!(report.excluded_by_reason.get("finished"), Some(&1));
        assert_eq!(report.excluded_by_reason.get("stale not-started"), Some(&1));
        assert_eq!(report.sports, vec!["Football"]);

        let board = state.board.read().await;
        assert!(board.is_live("live"));
        assert!(board.find("next").is_some());
        assert!(board.find("done").is_none());
        assert_eq!(state.catalog.read().await.len(), 1);
        assert_eq!(state.last_report.read().await.as_ref().map(|r| r.cycle), Some(1));
    }

    #[tokio::test]
    async fn test_catalog_fetched_once_per_ttl() {
        let state: AppState = Arc::new(DashboardState::new("test"));
        // Two catalog fetches across three cycles: t0, t0+30m (cached), t0+61m.
        let mut refresher = Refresher::new(
            FeedAggregator::new(vec![feed(Vec::new(), 2)]),
            BoardRules::default(),
            ZoneSpec::Utc,
            state,
        );
        refresher.refresh(now()).await;
        refresher.refresh(now() + Duration::minutes(30)).await;
        refresher.refresh(now() + Duration::minutes(61)).await;
        assert_eq!(refresher.cycles_run(), 3);
    }

    #[tokio::test]
    async fn test_failed_source_recorded_in_report() {
        let mut broken = MockFeedSource::new();
        broken.expect_name().return_const("broken".to_string());
        broken.expect_fetch_matches().returning(|| Err(anyhow::anyhow!("HTTP 502")));
        broken.expect_fetch_catalog().returning(|| Ok(Vec::new()));

        let state: AppState = Arc::new(DashboardState::new("test"));
        let mut refresher = Refresher::new(
            FeedAggregator::new(vec![Box::new(broken), feed(vec![at("next", "NS", 60)], 1)]),
            BoardRules::default(),
            ZoneSpec::Utc,
            state.clone(),
        )
        .with_catalog_ttl(Duration::hours(2));

        let report = refresher.refresh(now()).await;
        assert_eq!(report.sources.len(), 2);
        assert!(!report.sources[0].is_ok());
        assert_eq!(report.upcoming, 1);
        assert_eq!(state.board.read().await.total(), 1);
    }

    #[tokio::test]
    async fn test_live_copy_from_later_feed_wins() {
        let state: AppState = Arc::new(DashboardState::new("test"));
        let mut refresher = Refresher::new(
            FeedAggregator::new(vec![
                feed(vec![at("same", "NS", -30)], 1),
                feed(vec![at("same", "45'", -30)], 1),
            ]),
            BoardRules::default(),
            ZoneSpec::Utc,
            state.clone(),
        );

        let report = refresher.refresh(now()).await;
        assert_eq!((report.live, report.upcoming), (1, 0));
        assert_eq!(report.duplicates, 1);
        assert!(state.board.read().await.is_live("same"));
    }
}
