//! Editing a master's sparse calendar of working dates.

mod editor;
mod partition;

pub use editor::{CommitSummary, EditorState, WorkingDateEditor};
pub use partition::{ChangeKind, Partition, partition};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::error::{SyncError, SyncResult};
use crate::wire::parse_clock_time;

/// Opening hours for one working date. `start` is always before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkingHours {
    start: NaiveTime,
    end: NaiveTime,
}

impl WorkingHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> SyncResult<Self> {
        if start >= end {
            return Err(SyncError::InvalidHours(format!(
                "start {} is not before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(WorkingHours { start, end })
    }

    /// Parse `HH:MM` (or `HH:MM:SS`) bounds.
    pub fn parse(start: &str, end: &str) -> SyncResult<Self> {
        let parse = |s: &str| {
            parse_clock_time(s)
                .ok_or_else(|| SyncError::InvalidHours(format!("'{s}' is not a time of day")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

impl fmt::Display for WorkingHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// A date on which a master works, scoped to one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDate {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub branch_id: String,
}

impl WorkingDate {
    pub fn new(date: NaiveDate, hours: WorkingHours, branch_id: impl Into<String>) -> Self {
        WorkingDate {
            date,
            start_time: hours.start(),
            end_time: hours.end(),
            branch_id: branch_id.into(),
        }
    }
}

/// Server-side storage of working dates.
#[async_trait]
pub trait WorkingDateStore: Send + Sync {
    /// Active working dates of `master_id` in the given month.
    async fn list_working_dates(
        &self,
        master_id: &str,
        branch_id: &str,
        year: i32,
        month: u32,
    ) -> SyncResult<Vec<WorkingDate>>;

    async fn create_working_date(&self, master_id: &str, date: &WorkingDate) -> SyncResult<()>;

    async fn delete_working_date(
        &self,
        master_id: &str,
        date: NaiveDate,
        branch_id: &str,
    ) -> SyncResult<()>;
}

#[async_trait]
impl<T: WorkingDateStore + ?Sized> WorkingDateStore for Arc<T> {
    async fn list_working_dates(
        &self,
        master_id: &str,
        branch_id: &str,
        year: i32,
        month: u32,
    ) -> SyncResult<Vec<WorkingDate>> {
        (**self)
            .list_working_dates(master_id, branch_id, year, month)
            .await
    }

    async fn create_working_date(&self, master_id: &str, date: &WorkingDate) -> SyncResult<()> {
        (**self).create_working_date(master_id, date).await
    }

    async fn delete_working_date(
        &self,
        master_id: &str,
        date: NaiveDate,
        branch_id: &str,
    ) -> SyncResult<()> {
        (**self).delete_working_date(master_id, date, branch_id).await
    }
}
