pub mod config;
pub mod dates;
pub mod tasks;
pub mod toggle;
pub mod watch;

use salonsync_core::config::SalonConfig;
use salonsync_core::master::MasterRecord;
use salonsync_core::merge::{MergeOptions, MergeReport, merge_sorted, merge_with_options};
use salonsync_core::sort::SortSpec;
use salonsync_core::task::TaskRecord;

/// Merge tasks with the roster, sorted client-side when a sort was asked for.
fn enrich(
    tasks: &[TaskRecord],
    roster: &[MasterRecord],
    config: &SalonConfig,
    sort: Option<SortSpec>,
) -> MergeReport {
    let options = MergeOptions {
        client_fallback_name: config.client_fallback_name.clone(),
    };
    match sort {
        Some(spec) => merge_sorted(tasks, roster, &options, spec),
        None => merge_with_options(tasks, roster, &options),
    }
}
