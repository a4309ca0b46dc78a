//! Per-master edit session over the working-date calendar.
//!
//! The tentative selection is only ever a proposal: commits translate it into
//! create/delete requests and then reload the affected months, so what the
//! editor reports as working days always comes from the server.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use futures_util::future::join_all;
use tracing::{info, warn};

use super::partition::{ChangeKind, Partition, partition};
use super::{WorkingDate, WorkingDateStore, WorkingHours};
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No tentative selection.
    Idle,
    /// The user has picked dates that are not yet committed.
    Pending,
    /// Requests are in flight.
    Committing,
}

/// Outcome of one commit branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub kind: ChangeKind,
    pub succeeded: Vec<NaiveDate>,
    pub failed: Vec<(NaiveDate, String)>,
    /// Set when the post-commit reload failed; the editor then still shows
    /// the last state it fetched successfully.
    pub refresh_error: Option<String>,
}

impl CommitSummary {
    fn new(kind: ChangeKind) -> Self {
        CommitSummary {
            kind,
            succeeded: Vec::new(),
            failed: Vec::new(),
            refresh_error: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.refresh_error.is_none()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ChangeKind::Add => "Added",
            ChangeKind::Delete => "Removed",
        };
        let noun = if self.succeeded.len() == 1 { "working date" } else { "working dates" };
        write!(f, "{verb} {} {noun}", self.succeeded.len())?;

        if !self.failed.is_empty() {
            let reasons: Vec<_> = self
                .failed
                .iter()
                .map(|(date, reason)| format!("{date} ({reason})"))
                .collect();
            write!(f, ", {} failed: {}", self.failed.len(), reasons.join("; "))?;
        }

        if let Some(err) = &self.refresh_error {
            write!(f, "; could not reload calendar: {err}")?;
        }

        Ok(())
    }
}

pub struct WorkingDateEditor {
    master_id: String,
    branch_id: String,
    hours: WorkingHours,
    persisted: BTreeMap<NaiveDate, WorkingDate>,
    visible_months: BTreeSet<(i32, u32)>,
    selection: BTreeSet<NaiveDate>,
    state: EditorState,
}

impl WorkingDateEditor {
    /// `hours` apply to every date added through this editor.
    pub fn new(
        master_id: impl Into<String>,
        branch_id: impl Into<String>,
        hours: WorkingHours,
    ) -> Self {
        WorkingDateEditor {
            master_id: master_id.into(),
            branch_id: branch_id.into(),
            hours,
            persisted: BTreeMap::new(),
            visible_months: BTreeSet::new(),
            selection: BTreeSet::new(),
            state: EditorState::Idle,
        }
    }

    pub fn master_id(&self) -> &str {
        &self.master_id
    }

    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    pub fn hours(&self) -> WorkingHours {
        self.hours
    }

    pub fn set_hours(&mut self, hours: WorkingHours) {
        self.hours = hours;
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn selection(&self) -> &BTreeSet<NaiveDate> {
        &self.selection
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.persisted.contains_key(&date)
    }

    pub fn working_date(&self, date: NaiveDate) -> Option<&WorkingDate> {
        self.persisted.get(&date)
    }

    /// Persisted working dates in date order.
    pub fn working_dates(&self) -> impl Iterator<Item = &WorkingDate> {
        self.persisted.values()
    }

    pub fn persisted_dates(&self) -> BTreeSet<NaiveDate> {
        self.persisted.keys().copied().collect()
    }

    pub fn visible_months(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        self.visible_months.iter().copied()
    }

    /// Whether `date` falls in a loaded month.
    pub fn is_visible(&self, date: NaiveDate) -> bool {
        self.visible_months.contains(&(date.year(), date.month()))
    }

    /// Fetch one month and make it part of the visible calendar.
    pub async fn load_month<S>(&mut self, store: &S, year: i32, month: u32) -> SyncResult<()>
    where
        S: WorkingDateStore + ?Sized,
    {
        if !(1..=12).contains(&month) {
            return Err(SyncError::InvalidInput(format!("month {month} is out of range")));
        }

        let dates = store
            .list_working_dates(&self.master_id, &self.branch_id, year, month)
            .await?;
        self.replace_month(year, month, dates);
        self.visible_months.insert((year, month));
        Ok(())
    }

    /// Reload every visible month. Months that fail keep their previous
    /// contents; the first error is returned after all months were tried.
    pub async fn refresh<S>(&mut self, store: &S) -> SyncResult<()>
    where
        S: WorkingDateStore + ?Sized,
    {
        let months = self.visible_months.clone();
        self.reload_months(store, &months).await
    }

    /// Flip `date` in the tentative selection. Returns whether it is now selected.
    ///
    /// Only dates of loaded months can be selected; without the month loaded
    /// the editor cannot tell an addition from a removal.
    pub fn toggle(&mut self, date: NaiveDate) -> SyncResult<bool> {
        let selected = if self.selection.remove(&date) {
            false
        } else {
            self.ensure_visible(date)?;
            self.selection.insert(date);
            true
        };
        self.sync_state();
        Ok(selected)
    }

    pub fn select(&mut self, date: NaiveDate) -> SyncResult<()> {
        self.ensure_visible(date)?;
        self.selection.insert(date);
        self.sync_state();
        Ok(())
    }

    pub fn deselect(&mut self, date: NaiveDate) {
        self.selection.remove(&date);
        self.sync_state();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_state();
    }

    /// Split the current selection against the persisted set.
    pub fn plan(&self) -> Partition {
        partition(&self.selection, &self.persisted_dates())
    }

    /// Create every selected date that is not yet a working day.
    ///
    /// Does nothing when there is nothing to add. Otherwise each date is
    /// created independently, then the calendar is reloaded and the
    /// selection cleared.
    pub async fn commit_additions<S>(&mut self, store: &S) -> CommitSummary
    where
        S: WorkingDateStore + ?Sized,
    {
        let plan = self.plan();
        if plan.to_add.is_empty() {
            return CommitSummary::new(ChangeKind::Add);
        }

        self.state = EditorState::Committing;
        let mut summary = self.apply(store, ChangeKind::Add, &plan.to_add).await;
        summary.refresh_error = self.finish(store, &plan.to_add).await;
        summary
    }

    /// Remove every selected date that is already a working day, once
    /// `confirm` approves the list. Declining sends nothing and keeps the
    /// selection; the result is then `None`.
    pub async fn commit_deletions<S, C>(&mut self, store: &S, confirm: C) -> Option<CommitSummary>
    where
        S: WorkingDateStore + ?Sized,
        C: FnOnce(&[NaiveDate]) -> bool,
    {
        let plan = self.plan();
        if plan.to_delete.is_empty() {
            return Some(CommitSummary::new(ChangeKind::Delete));
        }

        let dates: Vec<_> = plan.to_delete.iter().copied().collect();
        if !confirm(&dates) {
            info!(master_id = %self.master_id, count = dates.len(), "deletion declined");
            return None;
        }

        self.state = EditorState::Committing;
        let mut summary = self.apply(store, ChangeKind::Delete, &plan.to_delete).await;
        summary.refresh_error = self.finish(store, &plan.to_delete).await;
        Some(summary)
    }

    /// Commit both halves of the plan: additions first, then deletions if
    /// `confirm` approves them. One reload follows. Returns a summary per
    /// branch that actually ran.
    pub async fn commit<S, C>(&mut self, store: &S, confirm: C) -> Vec<CommitSummary>
    where
        S: WorkingDateStore + ?Sized,
        C: FnOnce(&[NaiveDate]) -> bool,
    {
        let plan = self.plan();
        let mut summaries = Vec::new();
        let mut touched = BTreeSet::new();

        self.state = EditorState::Committing;

        if !plan.to_add.is_empty() {
            summaries.push(self.apply(store, ChangeKind::Add, &plan.to_add).await);
            touched.extend(plan.to_add.iter().copied());
        }

        let mut declined = BTreeSet::new();
        if !plan.to_delete.is_empty() {
            let dates: Vec<_> = plan.to_delete.iter().copied().collect();
            if confirm(&dates) {
                summaries.push(self.apply(store, ChangeKind::Delete, &plan.to_delete).await);
                touched.extend(plan.to_delete.iter().copied());
            } else {
                info!(master_id = %self.master_id, count = dates.len(), "deletion declined");
                declined = plan.to_delete;
            }
        }

        if summaries.is_empty() {
            self.sync_state();
            return summaries;
        }

        let refresh_error = self.finish(store, &touched).await;
        for summary in &mut summaries {
            summary.refresh_error = refresh_error.clone();
        }

        // declined removals stay picked, as with commit_deletions
        self.selection.extend(declined);
        self.sync_state();
        summaries
    }

    /// Issue one request per date concurrently; failures do not cancel
    /// the other requests.
    async fn apply<S>(
        &self,
        store: &S,
        kind: ChangeKind,
        dates: &BTreeSet<NaiveDate>,
    ) -> CommitSummary
    where
        S: WorkingDateStore + ?Sized,
    {
        let results = join_all(dates.iter().map(|date| async move {
            let result = match kind {
                ChangeKind::Add => {
                    let working_date = WorkingDate::new(*date, self.hours, &self.branch_id);
                    store
                        .create_working_date(&self.master_id, &working_date)
                        .await
                }
                ChangeKind::Delete => {
                    store
                        .delete_working_date(&self.master_id, *date, &self.branch_id)
                        .await
                }
            };
            (*date, result)
        }))
        .await;

        let mut summary = CommitSummary::new(kind);
        for (date, result) in results {
            match result {
                Ok(()) => summary.succeeded.push(date),
                Err(e) => {
                    warn!(master_id = %self.master_id, %date, %kind, error = %e, "working date change failed");
                    summary.failed.push((date, e.to_string()));
                }
            }
        }

        info!(
            master_id = %self.master_id,
            %kind,
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "working date changes applied"
        );

        summary
    }

    /// Reload visible months plus the months of `touched`, then drop the
    /// selection. Returns the reload error, if any.
    async fn finish<S>(&mut self, store: &S, touched: &BTreeSet<NaiveDate>) -> Option<String>
    where
        S: WorkingDateStore + ?Sized,
    {
        let mut months = self.visible_months.clone();
        months.extend(touched.iter().map(|d| (d.year(), d.month())));

        let refresh_error = match self.reload_months(store, &months).await {
            Ok(()) => None,
            Err(e) => {
                warn!(master_id = %self.master_id, error = %e, "reload after commit failed");
                Some(e.to_string())
            }
        };

        self.selection.clear();
        self.sync_state();
        refresh_error
    }

    async fn reload_months<S>(&mut self, store: &S, months: &BTreeSet<(i32, u32)>) -> SyncResult<()>
    where
        S: WorkingDateStore + ?Sized,
    {
        let mut first_error = None;

        for &(year, month) in months {
            match self.load_month(store, year, month).await {
                Ok(()) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn replace_month(&mut self, year: i32, month: u32, dates: Vec<WorkingDate>) {
        self.persisted
            .retain(|date, _| !(date.year() == year && date.month() == month));

        for working_date in dates {
            let date = working_date.date;
            if date.year() != year || date.month() != month {
                continue;
            }
            if working_date.branch_id != self.branch_id {
                continue;
            }
            self.persisted.insert(date, working_date);
        }
    }

    fn ensure_visible(&self, date: NaiveDate) -> SyncResult<()> {
        if self.is_visible(date) {
            Ok(())
        } else {
            Err(SyncError::InvalidInput(format!(
                "{date} is outside the loaded months; load {} first",
                date.format("%Y-%m")
            )))
        }
    }

    fn sync_state(&mut self) {
        self.state = if self.selection.is_empty() {
            EditorState::Idle
        } else {
            EditorState::Pending
        };
    }
}
