use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use owo_colors::OwoColorize;
use salonsync_core::{DateWindow, SyncResult};
use salonsync_core::api::ApiClient;
use salonsync_core::config::SalonConfig;
use salonsync_core::master::MasterRecord;
use salonsync_core::polling::{PollingSession, TaskBoard};
use salonsync_core::roster::RosterCache;
use salonsync_core::sort::SortSpec;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::enrich;
use crate::render::{self, Render};
use crate::utils::tui::clear_screen;

/// What the user typed at the watch prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Refresh,
    Show(DateWindow),
    Invalid(String),
}

pub async fn run(config: &SalonConfig, window: DateWindow, sort: Option<SortSpec>) -> Result<()> {
    let branch_id = config.require_branch()?;
    let api = ApiClient::from_config(config);
    let roster = RosterCache::new(api.clone(), config.roster_ttl);
    let session = PollingSession::new(api, config.polling_config());

    let (subscription, mut outcomes) = session.subscribe_channel();
    session.start(window)?;

    let mut board = TaskBoard::new();
    let mut masters: Arc<Vec<MasterRecord>> = Arc::new(Vec::new());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            outcome = outcomes.recv() => {
                let Some(outcome) = outcome else { break };
                if !board.apply(&outcome) {
                    continue;
                }
                match roster.roster(branch_id).await {
                    Ok(latest) => masters = latest,
                    Err(e) => warn!(error = %e, "roster refresh failed, keeping previous roster"),
                }
                draw(&board, &masters, config, sort, None);
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let current = session.window().unwrap_or(window);
                match parse_input(&line, current) {
                    // the outcome arrives through the subscription as well
                    Input::Refresh => {
                        session.fetch_manually(current).await;
                    }
                    Input::Show(next) => {
                        let result = session.set_window(next).await;
                        if let Some(notice) = window_change_notice(next, result) {
                            draw(&board, &masters, config, sort, Some(notice));
                        }
                    }
                    Input::Invalid(message) => draw(&board, &masters, config, sort, Some(message)),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.stop();
    subscription.unsubscribe();
    Ok(())
}

fn draw(
    board: &TaskBoard,
    masters: &[MasterRecord],
    config: &SalonConfig,
    sort: Option<SortSpec>,
    notice: Option<String>,
) {
    let report = enrich(board.tasks(), masters, config, sort);

    clear_screen();
    println!("{}", render::render_board_header(board));
    println!("{}", render::render_tasks(&report.records));
    for anomaly in &report.anomalies {
        println!("   {}", anomaly.render());
    }
    if let Some(notice) = notice {
        println!("\n{}", notice.yellow());
    }
    println!(
        "\n{}",
        "Enter: refresh · YYYY-MM-DD, + or -: change day · Ctrl-C: quit".dimmed()
    );
}

/// A failed restart keeps the watch running; the user just sees why.
fn window_change_notice(next: DateWindow, result: SyncResult<()>) -> Option<String> {
    match result {
        Ok(()) => None,
        Err(e) => {
            warn!(window = %next, error = %e, "could not switch window");
            Some(format!("Could not switch to {next}: {e}"))
        }
    }
}

fn parse_input(line: &str, current: DateWindow) -> Input {
    match line.trim() {
        "" => Input::Refresh,
        "+" => Input::Show(DateWindow::for_date(current.first + Duration::days(1))),
        "-" => Input::Show(DateWindow::for_date(current.first - Duration::days(1))),
        other => match DateWindow::from_args(Some(other), None) {
            Ok(next) => Input::Show(next),
            Err(e) => Input::Invalid(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use salonsync_core::SyncError;

    use super::*;

    fn window(d: u32) -> DateWindow {
        DateWindow::for_date(NaiveDate::from_ymd_opt(2025, 1, d).unwrap())
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("", window(5)), Input::Refresh);
        assert_eq!(parse_input(" + ", window(5)), Input::Show(window(6)));
        assert_eq!(parse_input("-", window(5)), Input::Show(window(4)));
        assert_eq!(parse_input("2025-01-20", window(5)), Input::Show(window(20)));
        assert!(matches!(parse_input("tomorrow", window(5)), Input::Invalid(_)));
    }

    #[test]
    fn test_failed_window_change_becomes_notice() {
        assert_eq!(window_change_notice(window(6), Ok(())), None);

        let notice = window_change_notice(window(6), Err(SyncError::AlreadyRunning)).unwrap();
        assert!(notice.contains("2025-01-06"));
        assert!(notice.contains(&SyncError::AlreadyRunning.to_string()));
    }
}
