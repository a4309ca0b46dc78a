//! HTTP client for the CRM REST API.
//!
//! Authentication is supplied from outside as a bearer token; a rejected
//! token is an ordinary `SyncError::Http` with status 401.

pub mod request;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::time::timeout;
use tracing::debug;

use crate::config::SalonConfig;
use crate::constants::DEFAULT_FETCH_TIMEOUT;
use crate::error::{SyncError, SyncResult};
use crate::fetch::{RosterFetcher, TaskFetcher, TaskQuery};
use crate::master::MasterRecord;
use crate::task::TaskRecord;
use crate::working_dates::{WorkingDate, WorkingDateStore};
use request::{
    ApiRequest, CreateWorkingDate, DeleteWorkingDate, ListStaff, ListTasks, ListWorkingDates,
};

/// Longest slice of an error body kept in `SyncError::Http`.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            request_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn from_config(config: &SalonConfig) -> Self {
        Self::new(config.api_url.clone(), config.token.clone())
            .with_timeout(config.fetch_timeout)
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a typed request and decode its response, bounded by the
    /// client's timeout.
    pub async fn call<R: ApiRequest>(&self, request: R) -> SyncResult<R::Response> {
        timeout(self.request_timeout, self.call_raw(&request))
            .await
            .map_err(|_| SyncError::Timeout(self.request_timeout.as_secs()))?
    }

    async fn call_raw<R: ApiRequest>(&self, request: &R) -> SyncResult<R::Response> {
        let url = format!("{}{}", self.base_url, request.path());
        let method = request.method();
        debug!(%method, %url, "api request");

        let mut builder = self.http.request(method, &url).query(&request.query());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body()? {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        R::decode(&bytes)
    }
}

/// Pull `message`/`error` out of a JSON error body, or fall back to a
/// trimmed excerpt of the raw text.
fn error_message(bytes: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.is_empty() {
        return "empty response body".to_string();
    }
    text.chars().take(ERROR_BODY_LIMIT).collect()
}

#[async_trait]
impl TaskFetcher for ApiClient {
    async fn fetch_tasks(&self, query: &TaskQuery) -> SyncResult<Vec<TaskRecord>> {
        self.call(ListTasks(query)).await
    }
}

#[async_trait]
impl RosterFetcher for ApiClient {
    async fn fetch_roster(&self, branch_id: &str) -> SyncResult<Vec<MasterRecord>> {
        self.call(ListStaff { branch_id }).await
    }
}

#[async_trait]
impl WorkingDateStore for ApiClient {
    async fn list_working_dates(
        &self,
        master_id: &str,
        branch_id: &str,
        year: i32,
        month: u32,
    ) -> SyncResult<Vec<WorkingDate>> {
        let entries = self
            .call(ListWorkingDates {
                master_id,
                branch_id,
                year,
                month,
            })
            .await?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_active)
            .map(|entry| WorkingDate {
                date: entry.work_date,
                start_time: entry.start_time,
                end_time: entry.end_time,
                branch_id: entry.branch_id.unwrap_or_else(|| branch_id.to_string()),
            })
            .collect())
    }

    async fn create_working_date(&self, master_id: &str, date: &WorkingDate) -> SyncResult<()> {
        self.call(CreateWorkingDate { master_id, date }).await
    }

    async fn delete_working_date(
        &self,
        master_id: &str,
        date: NaiveDate,
        branch_id: &str,
    ) -> SyncResult<()> {
        self.call(DeleteWorkingDate {
            master_id,
            date,
            branch_id,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_fields() {
        assert_eq!(error_message(br#"{"message": "Token expired"}"#), "Token expired");
        assert_eq!(error_message(br#"{"error": "Forbidden"}"#), "Forbidden");
        assert_eq!(error_message(b"  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message(b""), "empty response body");
    }

    #[test]
    fn test_base_url_loses_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/api/", None);
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }
}
