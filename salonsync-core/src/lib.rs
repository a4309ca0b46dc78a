//! Client-side sync core for the salon CRM.
//!
//! This crate provides the pieces a front end needs to keep appointment data
//! fresh and to edit staff calendars:
//! - `polling` keeps a task list fresh on a timer and fans results out
//! - `merge` enriches tasks with roster and client display data
//! - `working_dates` turns calendar picks into create/delete requests
//! - `api` talks to the CRM REST endpoints

pub mod api;
pub mod config;
pub mod constants;
pub mod date_window;
pub mod error;
pub mod fetch;
pub mod master;
pub mod merge;
pub mod polling;
pub mod roster;
pub mod sort;
pub mod task;
pub mod working_dates;

mod wire;

pub use date_window::DateWindow;
pub use error::{SyncError, SyncResult};
pub use master::MasterRecord;
pub use merge::{EnrichedTaskRecord, MergeOptions, merge};
pub use task::{ClientSnapshot, TaskRecord, TaskStatus};
