//! Human-readable "time until kickoff" labels for upcoming cards.

use chrono::{DateTime, Utc};

/// Label for a kickoff still in the future, `None` once it has passed.
///
/// - more than a day away: `"in 2d 3h"`
/// - more than an hour: `"in 4h 15m"`
/// - more than a minute: `"in 12m"`
/// - otherwise: `"Starting soon"`
pub fn time_until(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let remaining = kickoff - now;
    if remaining <= chrono::Duration::zero() {
        return None;
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;

    let label = if days > 0 {
        format!("in {days}d {hours}h")
    } else if hours > 0 {
        format!("in {hours}h {minutes}m")
    } else if minutes > 0 {
        format!("in {minutes}m")
    } else {
        "Starting soon".to_string()
    };
    Some(label)
}
