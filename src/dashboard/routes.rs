//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.
//! Countdown labels are computed per request, so cards stay current
//! between refreshes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::refresher::RefreshReport;
use crate::pipeline::countdown::time_until;
use crate::types::{Board, Match, SportEntry, SportGroups};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers. Written by the refresher.
pub struct DashboardState {
    pub app_name: String,
    pub started_at: DateTime<Utc>,
    pub board: RwLock<Board>,
    pub catalog: RwLock<Vec<SportEntry>>,
    pub last_report: RwLock<Option<RefreshReport>>,
}

impl DashboardState {
    pub fn new(app_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            app_name: app_name.into(),
            started_at: now,
            board: RwLock::new(Board::empty(now)),
            catalog: RwLock::new(Vec::new()),
            last_report: RwLock::new(None),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A match as rendered on a card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCard {
    #[serde(flatten)]
    pub game: Match,
    pub is_live: bool,
    /// "in 2h 5m"; upcoming cards only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<String>,
}

impl MatchCard {
    pub fn live(m: &Match) -> Self {
        Self { game: m.clone(), is_live: true, countdown: None }
    }

    pub fn upcoming(m: &Match, now: DateTime<Utc>) -> Self {
        Self {
            game: m.clone(),
            is_live: false,
            countdown: m.effective_start().and_then(|k| time_until(k, now)),
        }
    }

    fn from_board(board: &Board, m: &Match, now: DateTime<Utc>) -> Self {
        if board.is_live(&m.match_id) {
            Self::live(m)
        } else {
            Self::upcoming(m, now)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub name: String,
    pub uptime_secs: i64,
    pub generated_at: DateTime<Utc>,
    pub live_count: usize,
    pub upcoming_count: usize,
    pub sports: Vec<String>,
    pub last_refresh: Option<RefreshReport>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/board
pub async fn get_board(State(state): State<AppState>) -> Json<Board> {
    Json(state.board.read().await.clone())
}

/// GET /api/live
pub async fn get_live(State(state): State<AppState>) -> Json<Vec<MatchCard>> {
    let board = state.board.read().await;
    Json(board.live_matches.iter().map(MatchCard::live).collect())
}

/// GET /api/upcoming
pub async fn get_upcoming(State(state): State<AppState>) -> Json<SportGroups<MatchCard>> {
    let now = Utc::now();
    let board = state.board.read().await;
    Json(board.matches_by_sport.map(|m| MatchCard::upcoming(m, now)))
}

/// GET /api/sports
pub async fn get_sports(State(state): State<AppState>) -> Json<Vec<SportEntry>> {
    Json(state.catalog.read().await.clone())
}

/// GET /api/sports/:sport
pub async fn get_sport(
    State(state): State<AppState>,
    Path(sport): Path<String>,
) -> Result<Json<Vec<MatchCard>>, StatusCode> {
    let now = Utc::now();
    let board = state.board.read().await;
    let matches = board.matches_by_sport.get(&sport).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(matches.iter().map(|m| MatchCard::upcoming(m, now)).collect()))
}

/// GET /api/matches/:id
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchCard>, StatusCode> {
    let board = state.board.read().await;
    let m = board.find(&match_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(MatchCard::from_board(&board, m, Utc::now())))
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let board = state.board.read().await;
    let last_refresh = state.last_report.read().await.clone();

    Json(StatusResponse {
        name: state.app_name.clone(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        generated_at: board.generated_at,
        live_count: board.live_matches.len(),
        upcoming_count: board.matches_by_sport.match_count(),
        sports: board.matches_by_sport.sports().iter().map(|s| s.to_string()).collect(),
        last_refresh,
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
