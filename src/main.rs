//! MATCHBOARD — live and upcoming sports match board
//!
//! Entry point. Loads configuration, initialises structured logging, builds
//! the feed sources, starts the dashboard, and runs the poll → classify →
//! publish loop with graceful shutdown.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use matchboard::config;
use matchboard::dashboard::{self, routes::DashboardState};
use matchboard::engine::aggregator::FeedAggregator;
use matchboard::engine::refresher::{RefreshReport, Refresher};
use matchboard::feed;

const BANNER: &str = r#"
 __  __    _  _____ ____ _   _ ____   ___    _    ____  ____
|  \/  |  / \|_   _/ ___| | | | __ ) / _ \  / \  |  _ \|  _ \
| |\/| | / _ \ | || |   | |_| |  _ \| | | |/ _ \ | |_) | | | |
| |  | |/ ___ \| || |___|  _  | |_) | |_| / ___ \|  _ <| |_| |
|_|  |_/_/   \_\_| \____|_| |_|____/ \___/_/   \_\_| \_\____/

  Live & upcoming matches, v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    println!("{BANNER}");
    let viewer_zone = cfg.display_zone()?;
    info!(
        name = %cfg.app.name,
        poll_interval_secs = cfg.app.poll_interval_secs,
        display_timezone = %viewer_zone,
        feeds = cfg.enabled_feeds().count(),
        "MATCHBOARD starting up"
    );

    // -- Initialise components -------------------------------------------

    let sources = feed::build_feeds(&cfg.feeds, viewer_zone)?;
    let aggregator = FeedAggregator::new(sources);
    if aggregator.is_empty() {
        warn!("No feeds enabled; the board will stay empty");
    } else {
        info!(feeds = ?aggregator.feed_names(), "Feeds configured");
    }

    let state = Arc::new(DashboardState::new(cfg.app.name.clone()));
    if cfg.dashboard.enabled {
        dashboard::spawn_dashboard(state.clone(), cfg.dashboard.port).await?;
    }

    let mut refresher = Refresher::new(aggregator, cfg.board_rules(), viewer_zone, state);

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.app.poll_interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.app.poll_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = refresher.refresh(Utc::now()).await;
                log_source_failures(&report);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(cycles = refresher.cycles_run(), "MATCHBOARD shut down cleanly.");
    Ok(())
}

/// Surface sources that failed this cycle; an all-failed cycle publishes an
/// empty board.
fn log_source_failures(report: &RefreshReport) {
    let failed: Vec<&str> = report
        .sources
        .iter()
        .filter(|s| !s.is_ok())
        .map(|s| s.source.as_str())
        .collect();
    if !failed.is_empty() && failed.len() == report.sources.len() {
        warn!(cycle = report.cycle, sources = ?failed, "Every feed failed this cycle");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matchboard=info"));

    let json_logging = std::env::var("MATCHBOARD_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
