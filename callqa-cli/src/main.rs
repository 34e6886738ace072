//! `callqa` entry point.

use callqa_backend::AnalyzerClient;
use callqa_cli::commands;
use callqa_cli::config::{self, CONFIG_ENV};
use callqa_cli::error::CliError;
use callqa_cli::logging;
use callqa_cli::output;
use callqa_core::{CallId, RegionFilter};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "callqa")]
#[command(about = "Inspect call evaluations, region rollups and coaching lists")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = CONFIG_ENV, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score header, coaching notes and alerts for one call
    Call {
        call_id: String,
    },
    /// Region rollup (average, pass rate, common failures, recent calls)
    Rollup {
        /// Region name; omitted or "all" covers every region
        #[arg(short, long)]
        region: Option<String>,
        /// Compute from the evaluation list instead of asking the backend
        #[arg(long)]
        local: bool,
    },
    /// Calls that need supervisor coaching
    Coaching {
        /// Use the backend's coaching list instead of local selection
        #[arg(long)]
        remote: bool,
    },
    /// Load and validate the config file, then exit
    ValidateConfig,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    let client = AnalyzerClient::new(&config.backend)?;

    match cli.command {
        Command::Call { call_id } => {
            let report = commands::call_report(&client, &CallId::new(call_id)).await?;
            print_json(&report)?;
        }
        Command::Rollup { region, local } => {
            let region = RegionFilter::from_option(region.as_deref());
            let view = if local {
                commands::local_rollup(&client, &region, &config.rollup).await?
            } else {
                commands::remote_rollup(&client, &region).await?
            };
            print_json(&view)?;
        }
        Command::Coaching { remote } => {
            let entries = if remote {
                commands::remote_coaching(&client).await?
            } else {
                commands::local_coaching(&client, &config.coaching).await?
            };
            print_json(&entries)?;
        }
        Command::ValidateConfig => {
            tracing::info!(api_base_url = %config.backend.api_base_url, "configuration valid");
            print_json(&"ok")?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    output::write_json(&mut std::io::stdout().lock(), value)
}
