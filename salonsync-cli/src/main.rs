mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use salonsync_core::DateWindow;
use salonsync_core::config::SalonConfig;
use salonsync_core::sort::{SortKey, SortSpec};

#[derive(Parser)]
#[command(name = "salonsync")]
#[command(about = "Watch salon appointments and edit staff working dates")]
struct Cli {
    /// Branch to work with (overrides branch_id from config)
    #[arg(short, long, global = true)]
    branch: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch appointments once and print them
    Tasks {
        /// First day (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Last day (YYYY-MM-DD, defaults to --date)
        #[arg(long)]
        to: Option<String>,

        /// Sort by date, time, client, service or master
        #[arg(short, long)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Keep appointments on screen, refreshing every poll interval
    Watch {
        /// Day to watch (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        #[arg(short, long)]
        sort: Option<SortKey>,

        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Show a master's working dates for a month
    Dates {
        /// Master id
        #[arg(short, long)]
        master: String,

        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Toggle working dates: new dates are added, existing ones removed
    Toggle {
        #[arg(short, long)]
        master: String,

        /// Dates to toggle (YYYY-MM-DD)
        #[arg(required = true)]
        dates: Vec<String>,

        /// Start of the working day for added dates (HH:MM)
        #[arg(long)]
        start: Option<String>,

        /// End of the working day for added dates (HH:MM)
        #[arg(long)]
        end: Option<String>,

        /// Remove dates without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the config file location, or update it with the given values
    Config {
        /// Base URL of the CRM API
        #[arg(long)]
        api_url: Option<String>,

        /// Bearer token
        #[arg(long)]
        token: Option<String>,

        /// Default branch id
        #[arg(long)]
        branch_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::logging::init();

    let cli = Cli::parse();
    let branch = cli.branch;

    match cli.command {
        Commands::Config {
            api_url,
            token,
            branch_id,
        } => commands::config::run(api_url, token, branch_id),
        Commands::Tasks {
            date,
            to,
            sort,
            desc,
        } => {
            let config = load_config(branch)?;
            let window = DateWindow::from_args(date.as_deref(), to.as_deref())
                .map_err(|e| anyhow::anyhow!(e))?;
            commands::tasks::run(&config, window, sort_spec(sort, desc)).await
        }
        Commands::Watch { date, sort, desc } => {
            let config = load_config(branch)?;
            let window =
                DateWindow::from_args(date.as_deref(), None).map_err(|e| anyhow::anyhow!(e))?;
            commands::watch::run(&config, window, sort_spec(sort, desc)).await
        }
        Commands::Dates { master, month } => {
            let config = load_config(branch)?;
            commands::dates::run(&config, &master, month.as_deref()).await
        }
        Commands::Toggle {
            master,
            dates,
            start,
            end,
            yes,
        } => {
            let config = load_config(branch)?;
            commands::toggle::run(
                &config,
                &master,
                &dates,
                start.as_deref(),
                end.as_deref(),
                yes,
            )
            .await
        }
    }
}

fn load_config(branch_override: Option<String>) -> Result<SalonConfig> {
    let mut config = SalonConfig::load()?;
    if let Some(branch) = branch_override {
        config.branch_id = Some(branch);
    }
    Ok(config)
}

fn sort_spec(key: Option<SortKey>, desc: bool) -> Option<SortSpec> {
    key.map(|key| if desc { SortSpec::desc(key) } else { SortSpec::asc(key) })
}
