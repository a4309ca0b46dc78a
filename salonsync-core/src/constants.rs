use std::time::Duration;

/// Cadence of the polling timer.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound for a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between stop and start during a restart, so a fetch from the old
/// cycle can settle before the new one begins.
pub const DEFAULT_RESTART_SETTLE: Duration = Duration::from_millis(250);

/// How long a fetched roster stays fresh.
pub const DEFAULT_ROSTER_TTL: Duration = Duration::from_secs(30);

/// Client name shown when a task carries no usable name.
pub const DEFAULT_CLIENT_FALLBACK_NAME: &str = "Client";

pub const DEFAULT_WORK_START: &str = "09:00";
pub const DEFAULT_WORK_END: &str = "18:00";
