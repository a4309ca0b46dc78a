//! Terminal rendering for salonsync-core types.
//!
//! Extension traits that add colored output to core types using owo_colors.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use owo_colors::OwoColorize;
use salonsync_core::TaskStatus;
use salonsync_core::merge::{EnrichedTaskRecord, MasterAnomaly};
use salonsync_core::polling::TaskBoard;
use salonsync_core::working_dates::{ChangeKind, CommitSummary, Partition, WorkingDateEditor};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ChangeKind {
    fn render(&self) -> String {
        let symbol = self.to_string();
        match self {
            ChangeKind::Add => symbol.green().to_string(),
            ChangeKind::Delete => symbol.red().to_string(),
        }
    }
}

impl Render for TaskStatus {
    fn render(&self) -> String {
        let label = self.to_string();
        match self {
            TaskStatus::New => label.cyan().to_string(),
            TaskStatus::Scheduled => label.blue().to_string(),
            TaskStatus::InProgress => label.yellow().to_string(),
            TaskStatus::Completed => label.green().to_string(),
            TaskStatus::Cancelled | TaskStatus::NoShow => label.red().to_string(),
        }
    }
}

impl Render for EnrichedTaskRecord {
    fn render(&self) -> String {
        let task = &self.task;
        let time = match task.end_time {
            Some(end) => format!(
                "{}-{}",
                task.scheduled_time.format("%H:%M"),
                end.format("%H:%M")
            ),
            None => task.scheduled_time.format("%H:%M").to_string(),
        };
        let master = match &self.master_name {
            Some(name) => name.clone(),
            None if task.is_assigned() => "unknown master".red().to_string(),
            None => "unassigned".dimmed().to_string(),
        };
        let service = if task.service_type.is_empty() {
            "-"
        } else {
            task.service_type.as_str()
        };

        format!(
            "{} {} {}  {}  {}  {}",
            task.scheduled_date.format("%d.%m").dimmed(),
            time,
            self.client_name.bold(),
            service,
            master,
            task.status.render()
        )
    }
}

impl Render for CommitSummary {
    fn render(&self) -> String {
        let line = format!("{} {}", self.kind.render(), self);
        if self.is_clean() {
            line
        } else {
            line.yellow().to_string()
        }
    }
}

impl Render for MasterAnomaly {
    fn render(&self) -> String {
        format!(
            "task {} references master {} which is not in the roster",
            self.task_id, self.master_id
        )
        .dimmed()
        .to_string()
    }
}

/// Header line for the board: freshness plus an error badge after a failed tick.
pub fn render_board_header(board: &TaskBoard) -> String {
    let window = board
        .window()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "-".to_string());
    let updated = board
        .updated_at()
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut header = format!("📅 {}  {}", window.bold(), format!("updated {updated}").dimmed());
    if let Some(err) = board.last_error() {
        header.push_str(&format!("  {}", format!("⚠ refresh failed: {err}").red()));
    }
    header
}

pub fn render_tasks(records: &[EnrichedTaskRecord]) -> String {
    if records.is_empty() {
        return "   No appointments".dimmed().to_string();
    }

    records
        .iter()
        .map(|r| format!("   {}", r.render()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The dates a commit would touch, grouped by kind.
pub fn render_plan(plan: &Partition) -> String {
    if plan.is_empty() {
        return "   No changes".dimmed().to_string();
    }

    let mut lines = Vec::new();
    for kind in [ChangeKind::Add, ChangeKind::Delete] {
        for date in plan.dates(kind) {
            let label = date.format("%a %d %b %Y").to_string();
            let label = match kind {
                ChangeKind::Add => label.green().to_string(),
                ChangeKind::Delete => label.red().to_string(),
            };
            lines.push(format!("   {} {}", kind.render(), label));
        }
    }
    lines.join("\n")
}

/// Month grid with working days highlighted and selected days bracketed.
pub fn render_month(editor: &WorkingDateEditor, year: i32, month: u32) -> String {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return String::new();
    };

    let mut lines = vec![
        format!("   {}", first.format("%B %Y").bold()),
        format!("    {}", "Mo  Tu  We  Th  Fr  Sa  Su".dimmed()),
    ];

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut row = "    ".repeat(offset);
    let mut day = first;

    while day.month() == month {
        let number = format!("{:>2}", day.day());
        let cell = if editor.selection().contains(&day) {
            format!("[{}]", number).yellow().to_string()
        } else if editor.is_working_day(day) {
            format!(" {} ", number.green().bold())
        } else {
            format!(" {} ", number.dimmed())
        };
        row.push_str(&cell);

        if day.weekday() == Weekday::Sun {
            lines.push(format!("   {}", row.trim_end()));
            row.clear();
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    if !row.trim().is_empty() {
        lines.push(format!("   {}", row.trim_end()));
    }

    let count = editor
        .working_dates()
        .filter(|w| w.date.year() == year && w.date.month() == month)
        .count();
    lines.push(format!(
        "   {}",
        format!("{count} working {}", if count == 1 { "day" } else { "days" }).dimmed()
    ));

    lines.join("\n")
}
