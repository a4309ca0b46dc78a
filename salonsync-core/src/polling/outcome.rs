use std::fmt;

use chrono::{DateTime, Utc};

use crate::date_window::DateWindow;
use crate::error::SyncError;
use crate::task::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Timer,
    Manual,
}

impl fmt::Display for FetchOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOrigin::Timer => write!(f, "timer"),
            FetchOrigin::Manual => write!(f, "manual"),
        }
    }
}

/// Result of one fetch, as delivered to subscribers.
///
/// A failed outcome carries no tasks; consumers should keep showing the
/// data from the last successful one. `window` and `fetched_at` let a
/// consumer judge whether a late result is still relevant.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub success: bool,
    pub tasks: Vec<TaskRecord>,
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
    pub window: DateWindow,
    pub origin: FetchOrigin,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn succeeded(tasks: Vec<TaskRecord>, window: DateWindow, origin: FetchOrigin) -> Self {
        FetchOutcome {
            success: true,
            count: tasks.len(),
            tasks,
            fetched_at: Utc::now(),
            window,
            origin,
            error: None,
        }
    }

    pub fn failed(error: &SyncError, window: DateWindow, origin: FetchOrigin) -> Self {
        FetchOutcome {
            success: false,
            tasks: Vec::new(),
            count: 0,
            fetched_at: Utc::now(),
            window,
            origin,
            error: Some(error.to_string()),
        }
    }
}
