use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use salonsync_core::api::ApiClient;
use salonsync_core::config::SalonConfig;
use salonsync_core::working_dates::{WorkingDateEditor, WorkingHours};

use crate::render::{self, Render};
use crate::utils::tui::create_spinner;

pub async fn run(
    config: &SalonConfig,
    master_id: &str,
    dates: &[String],
    start: Option<&str>,
    end: Option<&str>,
    yes: bool,
) -> Result<()> {
    let branch_id = config.require_branch()?;
    let dates = parse_dates(dates)?;

    let api = ApiClient::from_config(config);
    let mut editor = WorkingDateEditor::new(master_id, branch_id, config.default_hours()?);
    if start.is_some() || end.is_some() {
        editor.set_hours(WorkingHours::parse(
            start.unwrap_or(&config.default_start_time),
            end.unwrap_or(&config.default_end_time),
        )?);
    }

    let months: BTreeSet<(i32, u32)> = dates.iter().map(|d| (d.year(), d.month())).collect();
    let spinner = create_spinner(format!("👤 master {master_id}"));
    for (year, month) in &months {
        if let Err(e) = editor.load_month(&api, *year, *month).await {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    }
    spinner.finish_and_clear();

    for date in &dates {
        editor.toggle(*date)?;
    }

    let plan = editor.plan();
    println!("{}", render::render_plan(&plan));
    if plan.is_empty() {
        return Ok(());
    }

    let summaries = editor
        .commit(&api, |to_remove| yes || confirm_removal(to_remove))
        .await;

    if summaries.is_empty() {
        println!("{}", "Nothing changed".dimmed());
        return Ok(());
    }

    println!();
    for summary in &summaries {
        println!("{}", summary.render());
    }

    let visible: Vec<_> = editor.visible_months().collect();
    for (year, month) in visible {
        println!();
        println!("{}", render::render_month(&editor, year, month));
    }

    Ok(())
}

fn parse_dates(raw: &[String]) -> Result<BTreeSet<NaiveDate>> {
    raw.iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{s}'. Expected YYYY-MM-DD"))
        })
        .collect()
}

fn confirm_removal(dates: &[NaiveDate]) -> bool {
    let noun = if dates.len() == 1 { "working date" } else { "working dates" };
    Confirm::new()
        .with_prompt(format!("Remove {} {noun}?", dates.len()))
        .default(false)
        .interact()
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dates_dedupes_and_sorts() {
        let raw = vec![
            "2025-01-03".to_string(),
            "2025-01-01".to_string(),
            "2025-01-03".to_string(),
        ];

        let dates = parse_dates(&raw).unwrap();

        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_dates_rejects_bad_input() {
        assert!(parse_dates(&["01/03/2025".to_string()]).is_err());
    }
}
