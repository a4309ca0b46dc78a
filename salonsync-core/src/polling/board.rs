use chrono::{DateTime, Utc};

use super::outcome::FetchOutcome;
use crate::date_window::DateWindow;
use crate::task::TaskRecord;

/// Consumer-side view of a polled task list.
///
/// Failed outcomes never clear the tasks; they only set `last_error`.
/// Outcomes are ordered by their own `fetched_at`, so a late delivery older
/// than what the board already shows is ignored.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<TaskRecord>,
    window: Option<DateWindow>,
    updated_at: Option<DateTime<Utc>>,
    latest_delivery: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an outcome into the board. Returns false if it was stale.
    pub fn apply(&mut self, outcome: &FetchOutcome) -> bool {
        if self
            .latest_delivery
            .is_some_and(|latest| outcome.fetched_at < latest)
        {
            return false;
        }
        self.latest_delivery = Some(outcome.fetched_at);

        if outcome.success {
            self.tasks = outcome.tasks.clone();
            self.window = Some(outcome.window);
            self.updated_at = Some(outcome.fetched_at);
            self.last_error = None;
        } else {
            self.last_error = outcome.error.clone();
        }
        true
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Window the shown tasks were fetched for.
    pub fn window(&self) -> Option<DateWindow> {
        self.window
    }

    /// When the shown tasks were fetched.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Error of the newest outcome, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime};

    use super::*;
    use crate::error::SyncError;
    use crate::polling::FetchOrigin;

    fn window() -> DateWindow {
        DateWindow::for_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    fn tasks(ids: &[&str]) -> Vec<TaskRecord> {
        ids.iter()
            .map(|id| {
                TaskRecord::new(
                    *id,
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                    NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_failure_keeps_previous_tasks() {
        let mut board = TaskBoard::new();
        board.apply(&FetchOutcome::succeeded(tasks(&["1", "2"]), window(), FetchOrigin::Timer));

        let mut failed = FetchOutcome::failed(
            &SyncError::Http {
                status: 503,
                message: "unavailable".into(),
            },
            window(),
            FetchOrigin::Timer,
        );
        failed.fetched_at += Duration::seconds(60);
        assert!(board.apply(&failed));

        assert_eq!(board.tasks().len(), 2);
        assert!(board.is_stale());
        assert!(board.last_error().unwrap().contains("503"));
    }

    #[test]
    fn test_success_clears_error() {
        let mut board = TaskBoard::new();
        let failed = FetchOutcome::failed(&SyncError::Timeout(30), window(), FetchOrigin::Timer);
        board.apply(&failed);

        let mut ok = FetchOutcome::succeeded(tasks(&["1"]), window(), FetchOrigin::Manual);
        ok.fetched_at = failed.fetched_at + Duration::seconds(1);
        board.apply(&ok);

        assert!(!board.is_stale());
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.window(), Some(window()));
    }

    #[test]
    fn test_older_delivery_is_ignored() {
        let mut board = TaskBoard::new();
        let newer = FetchOutcome::succeeded(tasks(&["new"]), window(), FetchOrigin::Manual);
        let mut older = FetchOutcome::succeeded(tasks(&["old"]), window(), FetchOrigin::Timer);
        older.fetched_at = newer.fetched_at - Duration::seconds(5);

        assert!(board.apply(&newer));
        assert!(!board.apply(&older));
        assert_eq!(board.tasks()[0].id, "new");
    }
}
