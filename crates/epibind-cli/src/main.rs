mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod ui;

use crate::cli::{Cli, Commands};
use crate::commands::predict::LogOptions;
use crate::error::{CliError, Result};
use crate::ui::UiManager;
use clap::Parser;
use tokio::task;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();

    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new(cli.quiet);
    let ui_handle = task::spawn(ui_manager.run());

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    let command_result = async {
        match cli.command {
            Commands::Predict(args) => {
                let log_options = LogOptions {
                    verbosity: cli.verbose,
                    quiet: cli.quiet,
                };
                let result = commands::predict::run(args, log_options, ui_sender).await;
                if result.is_ok() {
                    info!("epibind v{} finished.", env!("CARGO_PKG_VERSION"));
                }
                result
            }
            Commands::Alleles(args) => {
                logging::setup_logging(cli.verbose, cli.quiet, None, ui_sender)?;
                debug!("Dispatching to 'alleles' command.");
                commands::alleles::run(args)
            }
        }
    }
    .await;

    if let Err(e) = &command_result {
        error!(severity = "critical", "Command failed: {}", e);
    }

    if shutdown_sender.send(true).is_err() {
        warn!("UI manager may have already exited before shutdown signal.");
    }

    ui_handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI manager task failed: {}", e)))?;

    command_result
}
