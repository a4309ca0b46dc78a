//! Periodic task polling with fan-out to subscribers.

mod board;
mod outcome;
mod session;
mod subscribers;

pub use board::TaskBoard;
pub use outcome::{FetchOrigin, FetchOutcome};
pub use session::PollingSession;
pub use subscribers::Subscription;

use std::time::Duration;

use crate::constants::{DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_RESTART_SETTLE};
use crate::sort::SortSpec;

/// Static parameters of a polling session.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Required to start the timer.
    pub branch_id: Option<String>,
    pub user_role: Option<String>,
    pub user_master_id: Option<String>,
    /// Server-side ordering requested with every fetch.
    pub sort: Option<SortSpec>,
    pub interval: Duration,
    pub fetch_timeout: Duration,
    pub restart_settle: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            branch_id: None,
            user_role: None,
            user_master_id: None,
            sort: None,
            interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            restart_settle: DEFAULT_RESTART_SETTLE,
        }
    }
}

impl PollingConfig {
    pub fn for_branch(branch_id: impl Into<String>) -> Self {
        PollingConfig {
            branch_id: Some(branch_id.into()),
            ..PollingConfig::default()
        }
    }
}
