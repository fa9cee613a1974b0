use crate::cli::PredictArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::logging;
use crate::ui::{CliProgressHandler, UiEvent};
use epibind::{
    core::{io::fasta::FastaFile, models::record::Record, service::iedb::IedbClient},
    engine::{error::EngineError, progress::ProgressReporter},
    workflows::{self, predict::RunSummary},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub struct LogOptions {
    pub verbosity: u8,
    pub quiet: bool,
}

pub async fn run(
    args: PredictArgs,
    log_options: LogOptions,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    if !args.input.is_file() {
        return Err(CliError::Argument(format!(
            "Input FASTA file '{}' does not exist or is not a file.",
            args.input.display()
        )));
    }

    let today = chrono::Local::now().date_naive();
    let app_config = build_config(&args, today)?;
    let layout = &app_config.run_config.layout;

    layout
        .create_dirs()
        .map_err(|source| EngineError::OutputLayout {
            path: layout.root().to_path_buf(),
            source,
        })?;

    logging::setup_logging(
        log_options.verbosity,
        log_options.quiet,
        Some(layout.log_path()),
        ui_sender.clone(),
    )?;

    info!(
        "Starting process for FASTA file: {}",
        app_config.input_path.display()
    );
    debug!("Resolved run configuration: {:?}", app_config.run_config);
    println!("Results directory: {}", layout.root().display());

    let records =
        FastaFile::read_from_path(&app_config.input_path).map_err(|e| CliError::FileParsing {
            path: app_config.input_path.clone(),
            source: e.into(),
        })?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    // The blocking HTTP client owns a runtime of its own and must not be
    // created or dropped on an async worker.
    let summary = tokio::task::block_in_place(|| execute(records, &app_config, &reporter))?;

    match summary {
        RunSummary::NoInput => {
            println!(
                "No sequences found in '{}'. Nothing to do.",
                app_config.input_path.display()
            );
        }
        RunSummary::Completed { stats, .. } => {
            println!("Done! {}", stats);
            println!("Results saved under: {}", layout.root().display());
        }
    }

    Ok(())
}

fn execute(
    records: Vec<Record>,
    app_config: &AppConfig,
    reporter: &ProgressReporter,
) -> Result<RunSummary> {
    let client = IedbClient::new(
        app_config.service.endpoint.clone(),
        app_config.service.timeout,
    )?;
    info!("Submitting to {}", client.endpoint());

    let summary = workflows::predict::run(records, &app_config.run_config, &client, reporter)?;
    Ok(summary)
}
