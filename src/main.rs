use anyhow::Result;
use clap::{Parser, Subcommand};

use jobwatch::actions::ActionKind;
use jobwatch::{cli, config};

#[derive(Debug, Parser)]
#[command(name = "jobwatch")]
#[command(about = "Terminal companion for job task-monitor panels")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Follow the control panel with its auto-refresh countdown
    Watch {
        /// Control panel URL (defaults to the configured dashboard)
        url: Option<String>,
    },
    /// Follow a single job page: poll while running, count down otherwise
    Task {
        /// Job id on the panel
        jobid: i64,
        /// Task monitor base URL override
        #[arg(long)]
        url: Option<String>,
    },
    /// Rerun a job (asks to retype the job name first)
    Rerun {
        jobid: i64,
        #[arg(long)]
        url: Option<String>,
    },
    /// Enable a disabled job (asks to retype the job name first)
    Enable {
        jobid: i64,
        #[arg(long)]
        url: Option<String>,
    },
    /// Disable a job (asks to retype the job name first)
    Disable {
        jobid: i64,
        #[arg(long)]
        url: Option<String>,
    },
    /// Show the panel's job summary
    Summary {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        url: Option<String>,
    },
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = config::load();
    cli::init(&config);

    match app.command {
        Commands::Watch { url } => cli::run_watch(&config, url.as_deref()),
        Commands::Task { jobid, url } => cli::run_task(&config, jobid, url.as_deref()),
        Commands::Rerun { jobid, url } => {
            cli::run_action(&config, ActionKind::Rerun, jobid, url.as_deref())
        }
        Commands::Enable { jobid, url } => {
            cli::run_action(&config, ActionKind::Enable, jobid, url.as_deref())
        }
        Commands::Disable { jobid, url } => {
            cli::run_action(&config, ActionKind::Disable, jobid, url.as_deref())
        }
        Commands::Summary { format, url } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_summary(&config, fmt, url.as_deref())
        }
    }
}
