//! Sort keys shared by the merger and the task query.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    ScheduledDate,
    ScheduledTime,
    ClientName,
    ServiceType,
    MasterName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(key: SortKey) -> Self {
        SortSpec {
            key,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(key: SortKey) -> Self {
        SortSpec {
            key,
            order: SortOrder::Desc,
        }
    }
}

impl SortKey {
    /// Name of the key in the `sortBy` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::ScheduledDate => "scheduledDate",
            SortKey::ScheduledTime => "scheduledTime",
            SortKey::ClientName => "clientName",
            SortKey::ServiceType => "serviceType",
            SortKey::MasterName => "masterName",
        }
    }
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "date" | "scheduleddate" => Ok(SortKey::ScheduledDate),
            "time" | "scheduledtime" => Ok(SortKey::ScheduledTime),
            "client" | "clientname" => Ok(SortKey::ClientName),
            "service" | "servicetype" => Ok(SortKey::ServiceType),
            "master" | "mastername" => Ok(SortKey::MasterName),
            _ => Err(format!(
                "Unknown sort key '{s}'. Expected one of: date, time, client, service, master"
            )),
        }
    }
}
