//! Staff ("masters") as listed in a branch roster.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::wire;

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterRecord {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub specialization: Option<String>,

    #[serde(default = "default_active", alias = "is_active", alias = "active")]
    pub is_active: bool,

    #[serde(default, alias = "start_work_hour", with = "wire::opt_clock")]
    pub start_work_hour: Option<NaiveTime>,

    #[serde(default, alias = "end_work_hour", with = "wire::opt_clock")]
    pub end_work_hour: Option<NaiveTime>,

    #[serde(default, alias = "branch_id", deserialize_with = "wire::opt_id")]
    pub branch_id: Option<String>,
}

impl MasterRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        MasterRecord {
            id: id.into(),
            name: name.into(),
            specialization: None,
            is_active: true,
            start_work_hour: None,
            end_work_hour: None,
            branch_id: None,
        }
    }
}
