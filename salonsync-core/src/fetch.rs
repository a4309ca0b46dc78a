//! Read seams the polling engine and the CLI depend on.
//!
//! `ApiClient` implements these over HTTP; tests plug in fakes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::date_window::DateWindow;
use crate::error::SyncResult;
use crate::master::MasterRecord;
use crate::sort::SortSpec;
use crate::task::TaskRecord;

/// Parameters of one task query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub branch_id: String,
    pub window: DateWindow,
    pub sort: Option<SortSpec>,
    pub user_role: Option<String>,
    pub user_master_id: Option<String>,
}

impl TaskQuery {
    pub fn new(branch_id: impl Into<String>, window: DateWindow) -> Self {
        TaskQuery {
            branch_id: branch_id.into(),
            window,
            sort: None,
            user_role: None,
            user_master_id: None,
        }
    }
}

#[async_trait]
pub trait TaskFetcher: Send + Sync {
    async fn fetch_tasks(&self, query: &TaskQuery) -> SyncResult<Vec<TaskRecord>>;
}

#[async_trait]
pub trait RosterFetcher: Send + Sync {
    async fn fetch_roster(&self, branch_id: &str) -> SyncResult<Vec<MasterRecord>>;
}

#[async_trait]
impl<T: TaskFetcher + ?Sized> TaskFetcher for Arc<T> {
    async fn fetch_tasks(&self, query: &TaskQuery) -> SyncResult<Vec<TaskRecord>> {
        (**self).fetch_tasks(query).await
    }
}

#[async_trait]
impl<T: RosterFetcher + ?Sized> RosterFetcher for Arc<T> {
    async fn fetch_roster(&self, branch_id: &str) -> SyncResult<Vec<MasterRecord>> {
        (**self).fetch_roster(branch_id).await
    }
}
