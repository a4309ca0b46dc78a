use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use owo_colors::OwoColorize;
use salonsync_core::api::ApiClient;
use salonsync_core::config::SalonConfig;
use salonsync_core::working_dates::WorkingDateEditor;

use crate::render;
use crate::utils::tui::create_spinner;

pub async fn run(config: &SalonConfig, master_id: &str, month: Option<&str>) -> Result<()> {
    let branch_id = config.require_branch()?;
    let (year, month) = parse_month(month)?;

    let api = ApiClient::from_config(config);
    let mut editor = WorkingDateEditor::new(master_id, branch_id, config.default_hours()?);

    let spinner = create_spinner(format!("👤 master {master_id}"));
    let loaded = editor.load_month(&api, year, month).await;
    spinner.finish_and_clear();
    loaded?;

    println!("{}", render::render_month(&editor, year, month));
    for working_date in editor.working_dates() {
        println!(
            "   {} {}",
            working_date.date.format("%a %d %b").green(),
            format!(
                "{}-{}",
                working_date.start_time.format("%H:%M"),
                working_date.end_time.format("%H:%M")
            )
            .dimmed()
        );
    }

    Ok(())
}

/// Parse `YYYY-MM`, defaulting to the current month.
fn parse_month(month: Option<&str>) -> Result<(i32, u32)> {
    let Some(raw) = month else {
        let today = Local::now().date_naive();
        return Ok((today.year(), today.month()));
    };

    let first = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{raw}'. Expected YYYY-MM"))?;
    Ok((first.year(), first.month()))
}
