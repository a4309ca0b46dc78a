use anyhow::Result;
use owo_colors::OwoColorize;
use salonsync_core::DateWindow;
use salonsync_core::api::ApiClient;
use salonsync_core::config::SalonConfig;
use salonsync_core::polling::{PollingSession, TaskBoard};
use salonsync_core::roster::RosterCache;
use salonsync_core::sort::SortSpec;

use super::enrich;
use crate::render::{self, Render};
use crate::utils::tui::create_spinner;

pub async fn run(config: &SalonConfig, window: DateWindow, sort: Option<SortSpec>) -> Result<()> {
    let branch_id = config.require_branch()?;
    let api = ApiClient::from_config(config);
    let roster = RosterCache::new(api.clone(), config.roster_ttl);
    let session = PollingSession::new(api, config.polling_config());

    let spinner = create_spinner(format!("📅 {window}"));
    let (outcome, masters) = tokio::join!(session.fetch_manually(window), roster.roster(branch_id));
    spinner.finish_and_clear();

    if !outcome.success {
        anyhow::bail!(
            "Could not fetch appointments: {}",
            outcome.error.unwrap_or_default()
        );
    }
    let masters = masters?;

    let mut board = TaskBoard::new();
    board.apply(&outcome);
    let report = enrich(board.tasks(), &masters, config, sort);

    println!("{}", render::render_board_header(&board));
    println!("{}", render::render_tasks(&report.records));
    for anomaly in &report.anomalies {
        println!("   {}", anomaly.render());
    }
    println!(
        "\n{}",
        format!("{} appointments", outcome.count).dimmed()
    );

    Ok(())
}
