//! End-to-end classification over a recorded feed document.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use matchboard::dashboard::routes::DashboardState;
use matchboard::engine::aggregator::FeedAggregator;
use matchboard::engine::refresher::Refresher;
use matchboard::feed::parse_feed_document;
use matchboard::pipeline::normalize::Normalizer;
use matchboard::pipeline::relevance::Exclusion;
use matchboard::pipeline::{build_board, partition, BoardRules};
use matchboard::time::{ViewContext, ZoneSpec};
use matchboard::types::{Match, SportEntry};

use crate::mock_feed::StaticFeed;

const SNAPSHOT: &str = include_str!("../fixtures/snapshot.json");

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

fn ctx() -> ViewContext {
    ViewContext::new(now(), &ZoneSpec::Utc)
}

fn snapshot() -> Vec<Match> {
    let records = parse_feed_document(SNAPSHOT).unwrap();
    Normalizer::new("-05:00".parse().unwrap()).normalize_all("fixture", records)
}

fn ids(matches: &[Match]) -> Vec<&str> {
    matches.iter().map(|m| m.match_id.as_str()).collect()
}

#[test]
fn test_malformed_record_dropped_batch_continues() {
    let matches = snapshot();
    assert_eq!(matches.len(), 14);
    assert!(!matches.iter().any(|m| m.match_id == "no-teams"));
}

#[test]
fn test_every_match_in_exactly_one_partition() {
    let matches = snapshot();
    let p = partition(&matches, &ctx(), &BoardRules::default());
    assert_eq!(p.live.len() + p.upcoming.len() + p.excluded.len(), matches.len());

    let mut excluded = p.excluded.clone();
    excluded.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        excluded,
        vec![
            ("finished".to_string(), Exclusion::Finished),
            ("stale".to_string(), Exclusion::StaleNotStarted),
            ("undated".to_string(), Exclusion::Undated),
            ("yesterday".to_string(), Exclusion::BeforeToday),
        ]
    );
}

#[test]
fn test_live_ranked_by_popularity() {
    let board = build_board(&snapshot(), &ctx(), &BoardRules::default());
    assert_eq!(ids(&board.live_matches), vec!["live-epl", "live-nba", "live-regional"]);

    let epl = &board.live_matches[0];
    assert_eq!(epl.status, "45'");
    assert_eq!(epl.streams.len(), 2);
    assert_eq!(epl.league_logo.as_deref(), Some("https://img.example/pl.png"));
}

#[test]
fn test_upcoming_bucket_order_and_contents() {
    let board = build_board(&snapshot(), &ctx(), &BoardRules::default());
    let groups = &board.matches_by_sport;
    assert_eq!(groups.sports(), vec!["Football", "Basketball", "Tennis", "Golf", "Darts"]);
    assert_eq!(
        ids(groups.get("Football").unwrap()),
        vec!["recent", "football-early", "football-late"]
    );
    assert_eq!(ids(groups.get("Basketball").unwrap()), vec!["upcoming-nba"]);
}

#[test]
fn test_naive_start_time_read_in_source_zone() {
    let board = build_board(&snapshot(), &ctx(), &BoardRules::default());
    let late = board.find("football-late").unwrap();
    assert_eq!(late.kickoff, Some(Utc.with_ymd_and_hms(2025, 3, 1, 21, 0, 0).unwrap()));
    assert!(late.teams.home.logo_url.is_none());
}

#[test]
fn test_custom_priority_puts_unlisted_sports_alphabetically() {
    let rules = BoardRules {
        sport_priority: vec!["Football".to_string()],
        ..BoardRules::default()
    };
    let board = build_board(&snapshot(), &ctx(), &rules);
    assert_eq!(
        board.matches_by_sport.sports(),
        vec!["Football", "Basketball", "Darts", "Golf", "Tennis"]
    );
}

#[test]
fn test_same_input_same_board() {
    let matches = snapshot();
    let a = serde_json::to_string(&build_board(&matches, &ctx(), &BoardRules::default())).unwrap();
    let b = serde_json::to_string(&build_board(&matches, &ctx(), &BoardRules::default())).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_viewer_zone_defines_today() {
    // 04:30 UTC on 1 March is still 28 February in New York.
    let mut overnight = snapshot().remove(0);
    overnight.match_id = "overnight".into();
    overnight.kickoff = Some(Utc.with_ymd_and_hms(2025, 3, 1, 4, 30, 0).unwrap());
    let matches = vec![overnight];

    let utc_board = build_board(&matches, &ctx(), &BoardRules::default());
    assert!(utc_board.is_live("overnight"));

    let new_york = ViewContext::new(now(), &"America/New_York".parse::<ZoneSpec>().unwrap());
    let ny_board = build_board(&matches, &new_york, &BoardRules::default());
    assert_eq!(ny_board.total(), 0);
}

#[tokio::test]
async fn test_refresh_replaces_board_wholesale() {
    let feed = StaticFeed::new("static", snapshot()).with_catalog(vec![SportEntry {
        name: "football".into(),
        display_name: "Football".into(),
    }]);
    let handle = feed.snapshot_handle();
    let errors = feed.error_handle();

    let state = Arc::new(DashboardState::new("integration"));
    let mut refresher = Refresher::new(
        FeedAggregator::new(vec![Box::new(feed)]),
        BoardRules::default(),
        ZoneSpec::Utc,
        state.clone(),
    );

    let report = refresher.refresh(now()).await;
    assert_eq!((report.live, report.upcoming, report.excluded), (3, 7, 4));
    assert_eq!(state.catalog.read().await.len(), 1);

    // Next fetch only carries one match: nothing from the old board survives.
    handle.lock().unwrap().retain(|m| m.match_id == "tennis");
    let report = refresher.refresh(now()).await;
    assert_eq!((report.live, report.upcoming), (0, 1));
    assert_eq!(state.board.read().await.total(), 1);

    // A failing source contributes nothing; the cycle still completes.
    *errors.lock().unwrap() = Some("upstream timeout".into());
    let report = refresher.refresh(now()).await;
    assert_eq!(report.sources[0].error.as_deref(), Some("upstream timeout"));
    assert_eq!(state.board.read().await.total(), 0);
    assert_eq!(report.cycle, 3);
}
