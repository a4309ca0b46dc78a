//! Appointment records as the CRM API serves them.
//!
//! The client never owns these: every `TaskRecord` is a point-in-time
//! snapshot from the last fetch.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,

    #[serde(default, alias = "client_id", deserialize_with = "wire::opt_id")]
    pub client_id: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(alias = "scheduled_date", with = "wire::date")]
    pub scheduled_date: NaiveDate,

    #[serde(alias = "scheduled_time", with = "wire::clock")]
    pub scheduled_time: NaiveTime,

    #[serde(default, alias = "end_time", with = "wire::opt_clock")]
    pub end_time: Option<NaiveTime>,

    /// `None` means the task is unassigned.
    #[serde(default, alias = "master_id", deserialize_with = "wire::opt_id")]
    pub master_id: Option<String>,

    #[serde(default, alias = "service_type")]
    pub service_type: String,

    /// Minutes.
    #[serde(default)]
    pub duration: Option<u32>,

    #[serde(default, deserialize_with = "wire::opt_number")]
    pub price: Option<f64>,

    #[serde(default, alias = "payment_status")]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub client: Option<ClientSnapshot>,
}

/// Client fields embedded in a task at booking time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSnapshot {
    #[serde(default, alias = "custom_name")]
    pub custom_name: Option<String>,
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    New,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::New => "new",
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::NoShow => "no show",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    PartiallyPaid,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl TaskRecord {
    /// Minimal record for a booking; optional fields left empty.
    pub fn new(id: impl Into<String>, scheduled_date: NaiveDate, scheduled_time: NaiveTime) -> Self {
        TaskRecord {
            id: id.into(),
            client_id: None,
            status: TaskStatus::default(),
            scheduled_date,
            scheduled_time,
            end_time: None,
            master_id: None,
            service_type: String::new(),
            duration: None,
            price: None,
            payment_status: PaymentStatus::default(),
            notes: None,
            client: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.master_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_camel_case_payload() {
        let task: TaskRecord = serde_json::from_value(json!({
            "id": 41,
            "clientId": 7,
            "status": "in_progress",
            "scheduledDate": "2025-03-20T00:00:00.000Z",
            "scheduledTime": "14:30:00",
            "endTime": "15:30",
            "masterId": 3,
            "serviceType": "Haircut",
            "duration": 60,
            "price": "1500.00",
            "paymentStatus": "paid",
            "client": {"firstName": "Bob", "phone": "+100"}
        }))
        .unwrap();

        assert_eq!(task.id, "41");
        assert_eq!(task.client_id.as_deref(), Some("7"));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.scheduled_date, NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        assert_eq!(task.scheduled_time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(task.end_time, NaiveTime::from_hms_opt(15, 30, 0));
        assert_eq!(task.master_id.as_deref(), Some("3"));
        assert_eq!(task.price, Some(1500.0));
        assert_eq!(task.payment_status, PaymentStatus::Paid);
        assert_eq!(task.client.unwrap().first_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_decodes_snake_case_payload_with_nulls() {
        let task: TaskRecord = serde_json::from_value(json!({
            "id": "abc",
            "scheduled_date": "2025-03-20",
            "scheduled_time": "09:00",
            "master_id": null,
            "payment_status": "written_off",
            "client": null
        }))
        .unwrap();

        assert!(!task.is_assigned());
        assert_eq!(task.status, TaskStatus::New);
        assert_eq!(task.payment_status, PaymentStatus::Unknown);
        assert!(task.client.is_none());
    }
}
