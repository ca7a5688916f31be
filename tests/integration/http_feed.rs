//! Feed sources against a local HTTP server, through to the dashboard API.

use axum::{
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use matchboard::dashboard::{build_router, routes::DashboardState};
use matchboard::engine::aggregator::FeedAggregator;
use matchboard::engine::refresher::Refresher;
use matchboard::feed::{FeedSource, SnapshotFeed, SportApiFeed};
use matchboard::pipeline::normalize::Normalizer;
use matchboard::pipeline::BoardRules;
use matchboard::time::ZoneSpec;

const SNAPSHOT: &str = include_str!("../fixtures/snapshot.json");

async fn sport_matches(Path(sport): Path<String>) -> impl IntoResponse {
    match sport.as_str() {
        "football" => Json(json!([
            {
                "matchId": "api-fb-1",
                "title": "Barcelona vs Sevilla",
                "league": "La Liga",
                "teams": { "home": { "name": "Barcelona" }, "away": { "name": "Sevilla" } },
                "status": "NS",
                "date": "2025-03-01T20:00:00Z",
                "sport": "football"
            }
        ]))
        .into_response(),
        "basketball" => Json(json!({
            "matches": [
                {
                    "matchId": "api-bb-1",
                    "league": "EuroLeague",
                    "teams": { "home": { "name": "Olympiacos" }, "away": { "name": "Fenerbahce" } },
                    "status": "LIVE",
                    "timestamp": 1740850200
                },
                {
                    "matchId": "live-nba",
                    "league": "NBA",
                    "teams": { "home": { "name": "Duplicate" }, "away": { "name": "Entry" } },
                    "status": "NS",
                    "date": "2025-03-01T22:00:00Z"
                }
            ]
        }))
        .into_response(),
        _ => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

/// Serve fixtures on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let app = Router::new()
        .route("/matches.json", get(|| async { SNAPSHOT }))
        .route("/broken.json", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/garbage.json", get(|| async { "<html>not json</html>" }))
        .route(
            "/api/sports",
            get(|| async {
                Json(json!([
                    { "name": "football", "displayName": "Football" },
                    { "name": "basketball", "displayName": "Basketball" }
                ]))
            }),
        )
        .route("/api/matches/:sport", get(sport_matches));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn snapshot_feed(name: &str, url: String) -> SnapshotFeed {
    SnapshotFeed::new(
        name,
        url,
        Normalizer::new("-05:00".parse().unwrap()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn sport_api_feed(base: &str, sports: &[&str]) -> SportApiFeed {
    SportApiFeed::new(
        "sport-api",
        format!("{base}/api"),
        sports.iter().map(|s| s.to_string()).collect(),
        None,
        Normalizer::default(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_snapshot_feed_over_http() {
    let base = spawn_server().await;
    let matches = snapshot_feed("snap", format!("{base}/matches.json"))
        .fetch_matches()
        .await
        .unwrap();
    assert_eq!(matches.len(), 14);
}

#[tokio::test]
async fn test_snapshot_feed_http_error() {
    let base = spawn_server().await;
    let err = snapshot_feed("broken", format!("{base}/broken.json"))
        .fetch_matches()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));

    let err = snapshot_feed("garbage", format!("{base}/garbage.json"))
        .fetch_matches()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("malformed"));
}

#[tokio::test]
async fn test_sport_api_partial_failure() {
    let base = spawn_server().await;
    let matches = sport_api_feed(&base, &["football", "basketball", "curling"])
        .fetch_matches()
        .await
        .unwrap();
    let mut ids: Vec<&str> = matches.iter().map(|m| m.match_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["api-bb-1", "api-fb-1", "live-nba"]);

    let euro = matches.iter().find(|m| m.match_id == "api-bb-1").unwrap();
    assert_eq!(euro.sport, "Basketball");
}

#[tokio::test]
async fn test_sport_api_uses_catalog_when_unconfigured() {
    let base = spawn_server().await;
    let feed = sport_api_feed(&base, &[]);
    let catalog = feed.fetch_catalog().await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[1].display_name, "Basketball");
    assert_eq!(feed.fetch_matches().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_full_cycle_to_dashboard() {
    let base = spawn_server().await;
    let feeds: Vec<Box<dyn FeedSource>> = vec![
        Box::new(snapshot_feed("snap", format!("{base}/matches.json"))),
        Box::new(snapshot_feed("broken", format!("{base}/broken.json"))),
        Box::new(sport_api_feed(&base, &["football", "basketball"])),
    ];

    let state = Arc::new(DashboardState::new("MATCHBOARD"));
    let mut refresher = Refresher::new(
        FeedAggregator::new(feeds),
        BoardRules::default(),
        ZoneSpec::Utc,
        state.clone(),
    );

    let now = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
    let report = refresher.refresh(now).await;
    assert_eq!(report.sources.len(), 3);
    assert!(!report.sources[1].is_ok());
    // `live-nba` from the sport API loses to the snapshot's copy.
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.fetched, 16);

    let app = build_router(state);

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/api/board").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let board: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let live: Vec<&str> = board["liveMatches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["matchId"].as_str().unwrap())
        .collect();
    assert_eq!(live, vec!["live-epl", "live-nba", "api-bb-1", "live-regional"]);

    let football: Vec<&str> = board["matchesBySport"]["Football"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["matchId"].as_str().unwrap())
        .collect();
    assert_eq!(football, vec!["recent", "football-early", "api-fb-1", "football-late"]);

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/api/sports").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    let catalog: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(catalog.as_array().unwrap().len(), 2);

    let resp = app
        .oneshot(Request::builder().uri("/api/matches/live-epl").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    let detail: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(detail["isLive"], true);
    assert_eq!(detail["streams"][0]["url"], "https://embed.example/epl-1");
}
