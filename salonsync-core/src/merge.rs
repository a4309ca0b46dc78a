//! Enrichment of raw tasks with roster and client display data.
//!
//! `merge` is pure: it borrows both inputs, builds its master lookup per call
//! and returns new records. The only side effect is a warning log for tasks
//! whose master is missing from the roster.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::constants::DEFAULT_CLIENT_FALLBACK_NAME;
use crate::master::MasterRecord;
use crate::sort::{SortKey, SortOrder, SortSpec};
use crate::task::{ClientSnapshot, TaskRecord};

/// A task ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTaskRecord {
    #[serde(flatten)]
    pub task: TaskRecord,
    /// `None` when the task is unassigned or its master is not in the roster.
    pub master_name: Option<String>,
    pub client_name: String,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Shown when the client snapshot has no usable name.
    pub client_fallback_name: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            client_fallback_name: DEFAULT_CLIENT_FALLBACK_NAME.to_string(),
        }
    }
}

/// A task assigned to a master id the roster does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterAnomaly {
    pub task_id: String,
    pub master_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub records: Vec<EnrichedTaskRecord>,
    pub anomalies: Vec<MasterAnomaly>,
}

/// Enrich `tasks` against `roster`, keeping input order.
pub fn merge(tasks: &[TaskRecord], roster: &[MasterRecord]) -> Vec<EnrichedTaskRecord> {
    merge_with_options(tasks, roster, &MergeOptions::default()).records
}

pub fn merge_with_options(
    tasks: &[TaskRecord],
    roster: &[MasterRecord],
    options: &MergeOptions,
) -> MergeReport {
    let masters_by_id: HashMap<&str, &MasterRecord> =
        roster.iter().map(|m| (m.id.as_str(), m)).collect();

    let mut anomalies = Vec::new();

    let records = tasks
        .iter()
        .map(|task| {
            let master_name = match task.master_id.as_deref() {
                None => None,
                Some(master_id) => match masters_by_id.get(master_id) {
                    Some(master) => Some(master.name.clone()),
                    None => {
                        warn!(
                            task_id = %task.id,
                            master_id,
                            "task references a master missing from the roster"
                        );
                        anomalies.push(MasterAnomaly {
                            task_id: task.id.clone(),
                            master_id: master_id.to_string(),
                        });
                        None
                    }
                },
            };

            EnrichedTaskRecord {
                task: task.clone(),
                master_name,
                client_name: client_display_name(
                    task.client.as_ref(),
                    &options.client_fallback_name,
                ),
            }
        })
        .collect();

    MergeReport { records, anomalies }
}

/// Merge, then sort by `spec`.
pub fn merge_sorted(
    tasks: &[TaskRecord],
    roster: &[MasterRecord],
    options: &MergeOptions,
    spec: SortSpec,
) -> MergeReport {
    let mut report = merge_with_options(tasks, roster, options);
    sort_enriched(&mut report.records, spec);
    report
}

/// Sort by the requested key; ties fall back to start time ascending, then id.
pub fn sort_enriched(records: &mut [EnrichedTaskRecord], spec: SortSpec) {
    records.sort_by(|a, b| {
        let primary = compare_by_key(a, b, spec.key);
        let primary = match spec.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary
            .then_with(|| a.task.scheduled_time.cmp(&b.task.scheduled_time))
            .then_with(|| compare_ids(&a.task.id, &b.task.id))
    });
}

/// Custom name, then first name, then first and last joined, then `fallback`.
pub fn client_display_name(client: Option<&ClientSnapshot>, fallback: &str) -> String {
    let Some(client) = client else {
        return fallback.to_string();
    };

    if let Some(name) = non_blank(&client.custom_name) {
        return name.to_string();
    }
    if let Some(name) = non_blank(&client.first_name) {
        return name.to_string();
    }

    let full = [non_blank(&client.first_name), non_blank(&client.last_name)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if !full.is_empty() {
        return full;
    }

    fallback.to_string()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn compare_by_key(a: &EnrichedTaskRecord, b: &EnrichedTaskRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::ScheduledDate => a.task.scheduled_date.cmp(&b.task.scheduled_date),
        SortKey::ScheduledTime => a.task.scheduled_time.cmp(&b.task.scheduled_time),
        SortKey::ClientName => compare_text(&a.client_name, &b.client_name),
        SortKey::ServiceType => compare_text(&a.task.service_type, &b.task.service_type),
        SortKey::MasterName => match (&a.master_name, &b.master_name) {
            (Some(x), Some(y)) => compare_text(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Numeric ids first in numeric order, then everything else as text.
/// The raw text breaks remaining ties ("09" vs "9") so the order is total.
fn compare_ids(a: &str, b: &str) -> Ordering {
    id_key(a).cmp(&id_key(b))
}

fn id_key(id: &str) -> (bool, u64, &str) {
    match id.parse::<u64>() {
        Ok(n) => (false, n, id),
        Err(_) => (true, 0, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn task(id: &str, master_id: Option<&str>, first_name: &str) -> TaskRecord {
        let mut task = TaskRecord::new(
            id,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        task.master_id = master_id.map(String::from);
        task.client = Some(ClientSnapshot {
            first_name: Some(first_name.to_string()),
            ..ClientSnapshot::default()
        });
        task
    }

    fn at(mut task: TaskRecord, hour: u32) -> TaskRecord {
        task.scheduled_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
        task
    }

    #[test]
    fn test_resolves_master_and_client_names() {
        let roster = vec![MasterRecord::new("3", "Anna")];
        let tasks = vec![task("1", Some("3"), "Bob")];

        let merged = merge(&tasks, &roster);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].master_name.as_deref(), Some("Anna"));
        assert_eq!(merged[0].client_name, "Bob");
        assert_eq!(merged[0].task, tasks[0]);
    }

    #[test]
    fn test_unknown_master_is_reported_not_fabricated() {
        let roster = vec![MasterRecord::new("3", "Anna")];
        let tasks = vec![task("1", Some("99"), "Bob"), task("2", None, "Eve")];

        let report = merge_with_options(&tasks, &roster, &MergeOptions::default());

        assert_eq!(report.records[0].master_name, None);
        assert_eq!(report.records[1].master_name, None);
        assert_eq!(
            report.anomalies,
            vec![MasterAnomaly {
                task_id: "1".into(),
                master_id: "99".into()
            }]
        );
    }

    #[test]
    fn test_merge_is_total_and_keeps_order() {
        let roster = vec![MasterRecord::new("1", "Zoe"), MasterRecord::new("2", "Ann")];
        let tasks = vec![
            task("c", Some("2"), "Carl"),
            task("a", Some("1"), "Ada"),
            task("b", None, "Ben"),
            task("d", Some("7"), "Dan"),
        ];

        let merged = merge(&tasks, &roster);

        let ids: Vec<_> = merged.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_merge_on_empty_inputs() {
        assert!(merge(&[], &[MasterRecord::new("1", "Zoe")]).is_empty());
        assert_eq!(merge(&[task("1", Some("1"), "Bob")], &[]).len(), 1);
    }

    #[test]
    fn test_client_name_precedence() {
        let fallback = "Client";
        let mut client = ClientSnapshot {
            custom_name: Some("VIP Olga".into()),
            first_name: Some("Olga".into()),
            last_name: Some("Ivanova".into()),
            phone: None,
        };
        assert_eq!(client_display_name(Some(&client), fallback), "VIP Olga");

        client.custom_name = Some("   ".into());
        assert_eq!(client_display_name(Some(&client), fallback), "Olga");

        client.first_name = None;
        assert_eq!(client_display_name(Some(&client), fallback), "Ivanova");

        client.last_name = None;
        assert_eq!(client_display_name(Some(&client), fallback), "Client");
        assert_eq!(client_display_name(None, "Клиент"), "Клиент");
    }

    #[test]
    fn test_sort_by_master_name_puts_unresolved_last() {
        let roster = vec![MasterRecord::new("1", "zoe"), MasterRecord::new("2", "Anna")];
        let tasks = vec![
            task("1", None, "A"),
            task("2", Some("1"), "B"),
            task("3", Some("2"), "C"),
        ];

        let report = merge_sorted(
            &tasks,
            &roster,
            &MergeOptions::default(),
            SortSpec::asc(SortKey::MasterName),
        );

        let ids: Vec<_> = report.records.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_sort_ties_break_on_time_then_id() {
        let tasks = vec![
            at(task("10", None, "Same"), 12),
            at(task("9", None, "Same"), 12),
            at(task("11", None, "Same"), 9),
        ];

        let report = merge_sorted(
            &tasks,
            &[],
            &MergeOptions::default(),
            SortSpec::desc(SortKey::ClientName),
        );

        let ids: Vec<_> = report.records.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "9", "10"]);
    }

    #[test]
    fn test_id_tie_break_ignores_input_order() {
        let ids = ["9", "10", "1a", "09"];
        let orderings = [
            [0, 1, 2, 3],
            [3, 2, 1, 0],
            [2, 0, 1, 3],
            [1, 3, 0, 2],
            [0, 2, 3, 1],
            [3, 0, 2, 1],
        ];

        for ordering in orderings {
            let tasks: Vec<_> = ordering.iter().map(|&i| task(ids[i], None, "Same")).collect();

            let report = merge_sorted(
                &tasks,
                &[],
                &MergeOptions::default(),
                SortSpec::asc(SortKey::ScheduledDate),
            );

            let sorted: Vec<_> = report.records.iter().map(|r| r.task.id.as_str()).collect();
            assert_eq!(sorted, vec!["09", "9", "10", "1a"], "input order {ordering:?}");
        }
    }

    #[test]
    fn test_compare_ids_is_transitive_across_numeric_and_text() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("10", "1a"), Ordering::Less);
        assert_eq!(compare_ids("9", "1a"), Ordering::Less);
        assert_eq!(compare_ids("abc", "abd"), Ordering::Less);
        assert_eq!(compare_ids("7", "7"), Ordering::Equal);
    }

    #[test]
    fn test_sort_descending_by_time() {
        let tasks = vec![
            at(task("1", None, "A"), 9),
            at(task("2", None, "B"), 15),
            at(task("3", None, "C"), 11),
        ];

        let report = merge_sorted(
            &tasks,
            &[],
            &MergeOptions::default(),
            SortSpec::desc(SortKey::ScheduledTime),
        );

        let ids: Vec<_> = report.records.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }
}
