//! Typed CRM endpoints.
//!
//! Each request type knows its method, path, query and body, and names the
//! type its response decodes into.

use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::fetch::TaskQuery;
use crate::master::MasterRecord;
use crate::task::TaskRecord;
use crate::wire;
use crate::working_dates::WorkingDate;

pub trait ApiRequest {
    type Response;

    fn method(&self) -> Method;

    fn path(&self) -> String;

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn body(&self) -> SyncResult<Option<serde_json::Value>> {
        Ok(None)
    }

    fn decode(bytes: &[u8]) -> SyncResult<Self::Response>;
}

/// Percent-encode one path segment.
fn segment(raw: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(raw)
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> SyncResult<T> {
    serde_json::from_slice(bytes).map_err(|e| SyncError::Decode(e.to_string()))
}

// ============================================================================
// Tasks
// ============================================================================

/// `GET /tasks`
pub struct ListTasks<'a>(pub &'a TaskQuery);

impl ApiRequest for ListTasks<'_> {
    type Response = Vec<TaskRecord>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        "/tasks".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let q = self.0;
        let mut params = vec![
            ("branchId", q.branch_id.clone()),
            ("scheduledAfter", q.window.scheduled_after_rfc3339()),
            ("scheduledBefore", q.window.scheduled_before_rfc3339()),
        ];
        if let Some(sort) = q.sort {
            params.push(("sortBy", sort.key.as_param().to_string()));
            params.push(("sortOrder", sort.order.as_param().to_string()));
        }
        if let Some(role) = &q.user_role {
            params.push(("userRole", role.clone()));
        }
        if let Some(master_id) = &q.user_master_id {
            params.push(("userMasterId", master_id.clone()));
        }
        params
    }

    fn decode(bytes: &[u8]) -> SyncResult<Self::Response> {
        decode_json(bytes)
    }
}

// ============================================================================
// Staff
// ============================================================================

/// `GET /staff`
pub struct ListStaff<'a> {
    pub branch_id: &'a str,
}

/// The staff endpoint answers with a bare array or wraps it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RosterPayload {
    List(Vec<MasterRecord>),
    Data { data: Vec<MasterRecord> },
    Staff { staff: Vec<MasterRecord> },
}

impl RosterPayload {
    pub fn into_masters(self) -> Vec<MasterRecord> {
        match self {
            RosterPayload::List(masters)
            | RosterPayload::Data { data: masters }
            | RosterPayload::Staff { staff: masters } => masters,
        }
    }
}

impl ApiRequest for ListStaff<'_> {
    type Response = Vec<MasterRecord>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        "/staff".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("branchId", self.branch_id.to_string())]
    }

    fn decode(bytes: &[u8]) -> SyncResult<Self::Response> {
        decode_json::<RosterPayload>(bytes).map(RosterPayload::into_masters)
    }
}

// ============================================================================
// Working dates
// ============================================================================

/// Row of `GET /masters/{id}/working-dates`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkingDateEntry {
    #[serde(with = "wire::date")]
    pub work_date: NaiveDate,
    #[serde(with = "wire::clock")]
    pub start_time: NaiveTime,
    #[serde(with = "wire::clock")]
    pub end_time: NaiveTime,
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub branch_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// `GET /masters/{id}/working-dates`
pub struct ListWorkingDates<'a> {
    pub master_id: &'a str,
    pub branch_id: &'a str,
    pub year: i32,
    pub month: u32,
}

impl ApiRequest for ListWorkingDates<'_> {
    type Response = Vec<WorkingDateEntry>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("/masters/{}/working-dates", segment(self.master_id))
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("month", self.month.to_string()),
            ("year", self.year.to_string()),
            ("branchId", self.branch_id.to_string()),
        ]
    }

    fn decode(bytes: &[u8]) -> SyncResult<Self::Response> {
        decode_json(bytes)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWorkingDateBody {
    work_date: String,
    start_time: String,
    end_time: String,
    branch_id: String,
}

/// `POST /masters/{id}/working-dates`
pub struct CreateWorkingDate<'a> {
    pub master_id: &'a str,
    pub date: &'a WorkingDate,
}

impl ApiRequest for CreateWorkingDate<'_> {
    type Response = ();

    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!("/masters/{}/working-dates", segment(self.master_id))
    }

    fn body(&self) -> SyncResult<Option<serde_json::Value>> {
        let body = CreateWorkingDateBody {
            work_date: self.date.date.format("%Y-%m-%d").to_string(),
            start_time: self.date.start_time.format("%H:%M").to_string(),
            end_time: self.date.end_time.format("%H:%M").to_string(),
            branch_id: self.date.branch_id.clone(),
        };
        serde_json::to_value(body)
            .map(Some)
            .map_err(|e| SyncError::Encode(e.to_string()))
    }

    /// The created row is ignored; callers reload the month instead.
    fn decode(_bytes: &[u8]) -> SyncResult<Self::Response> {
        Ok(())
    }
}

/// `DELETE /masters/{id}/working-dates/{workDate}`
pub struct DeleteWorkingDate<'a> {
    pub master_id: &'a str,
    pub date: NaiveDate,
    pub branch_id: &'a str,
}

impl ApiRequest for DeleteWorkingDate<'_> {
    type Response = ();

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn path(&self) -> String {
        format!(
            "/masters/{}/working-dates/{}",
            segment(self.master_id),
            self.date.format("%Y-%m-%d")
        )
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("branchId", self.branch_id.to_string())]
    }

    fn decode(_bytes: &[u8]) -> SyncResult<Self::Response> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_window::DateWindow;
    use crate::sort::{SortKey, SortSpec};

    #[test]
    fn test_task_query_parameters() {
        let mut query = TaskQuery::new(
            "4",
            DateWindow::for_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        );
        query.sort = Some(SortSpec::desc(SortKey::ScheduledTime));
        query.user_role = Some("master".into());

        let params = ListTasks(&query).query();

        assert!(params.contains(&("branchId", "4".to_string())));
        assert!(params.contains(&("scheduledAfter", "2024-12-31T23:59:00.000Z".to_string())));
        assert!(params.contains(&("scheduledBefore", "2025-01-01T23:59:00.000Z".to_string())));
        assert!(params.contains(&("sortBy", "scheduledTime".to_string())));
        assert!(params.contains(&("sortOrder", "desc".to_string())));
        assert!(params.contains(&("userRole", "master".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "userMasterId"));
    }

    #[test]
    fn test_roster_envelopes() {
        let bare = br#"[{"id": 3, "name": "Anna"}]"#;
        let data = br#"{"data": [{"id": 3, "name": "Anna"}]}"#;
        let staff = br#"{"staff": [{"id": "3", "name": "Anna", "is_active": false}]}"#;

        for body in [&bare[..], &data[..], &staff[..]] {
            let masters = ListStaff::decode(body).unwrap();
            assert_eq!(masters.len(), 1);
            assert_eq!(masters[0].id, "3");
            assert_eq!(masters[0].name, "Anna");
        }
    }

    #[test]
    fn test_roster_rejects_unknown_shape() {
        assert!(matches!(
            ListStaff::decode(br#"{"masters": []}"#),
            Err(SyncError::Decode(_))
        ));
    }

    #[test]
    fn test_master_id_is_escaped_in_paths() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let working_date = WorkingDate::new(
            date,
            crate::working_dates::WorkingHours::parse("09:00", "18:00").unwrap(),
            "4",
        );

        let delete = DeleteWorkingDate {
            master_id: "7/../admin",
            date,
            branch_id: "4",
        };
        let create = CreateWorkingDate {
            master_id: "a b",
            date: &working_date,
        };

        assert_eq!(delete.path(), "/masters/7%2F..%2Fadmin/working-dates/2025-01-02");
        assert_eq!(create.path(), "/masters/a%20b/working-dates");
    }

    #[test]
    fn test_create_body_is_camel_case() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let working_date = WorkingDate::new(
            date,
            crate::working_dates::WorkingHours::parse("10:00", "16:30").unwrap(),
            "4",
        );

        let body = CreateWorkingDate {
            master_id: "3",
            date: &working_date,
        }
        .body()
        .unwrap()
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "workDate": "2025-01-02",
                "startTime": "10:00",
                "endTime": "16:30",
                "branchId": "4",
            })
        );
    }
}
