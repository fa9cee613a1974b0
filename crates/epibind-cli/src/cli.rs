use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan",
    version,
    about = "epibind CLI - Batch MHC class II binding predictions for every sequence in a FASTA file.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase console log verbosity (-v for INFO, -vv for DEBUG, -vvv for TRACE).
    /// The run log under the results directory is always written.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hide progress bars and all console log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit every sequence in a FASTA file for binding prediction and save the results.
    Predict(PredictArgs),
    /// List the built-in allele sets.
    Alleles(AllelesArgs),
}

/// Arguments for the `predict` subcommand.
#[derive(Args, Debug)]
pub struct PredictArgs {
    // --- Core Arguments ---
    /// Path to the input FASTA file.
    #[arg(required = true, value_name = "FASTA")]
    pub input: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory under which the dated results directory is created.
    #[arg(short, long = "output-dir", value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    // --- Prediction Overrides ---
    /// Species whose built-in allele set is used (e.g., 'mouse', 'human').
    #[arg(short, long, value_name = "NAME")]
    pub species: Option<String>,

    /// Explicit comma-separated allele list, overriding the species preset.
    #[arg(short, long, value_name = "LIST")]
    pub alleles: Option<String>,

    /// Prediction method understood by the service.
    #[arg(short, long, value_name = "NAME")]
    pub method: Option<String>,

    // --- Execution Overrides ---
    /// Number of records processed concurrently.
    #[arg(short, long, value_name = "NUM")]
    pub workers: Option<usize>,

    /// Maximum number of attempts per record.
    #[arg(long, value_name = "INT")]
    pub max_retries: Option<usize>,

    /// Pause after a failed attempt, in seconds.
    #[arg(long, value_name = "SECS")]
    pub retry_delay: Option<f64>,

    /// Disable the random pauses before each task and each attempt.
    #[arg(long)]
    pub no_jitter: bool,

    // --- Service Overrides ---
    /// URL of the prediction endpoint.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Per-request timeout, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S retry.max-retries=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `alleles` subcommand.
#[derive(Args, Debug)]
pub struct AllelesArgs {
    /// Only show the preset for this species.
    #[arg(short, long, value_name = "NAME")]
    pub species: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_requires_only_the_input_path() {
        let cli = Cli::try_parse_from(["epibind", "predict", "proteome.fasta"]).unwrap();
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.input, PathBuf::from("proteome.fasta"));
        assert!(args.species.is_none());
        assert!(args.set_values.is_empty());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn predict_without_input_is_rejected() {
        assert!(Cli::try_parse_from(["epibind", "predict"]).is_err());
    }

    #[test]
    fn overrides_and_global_flags_parse() {
        let cli = Cli::try_parse_from([
            "epibind",
            "predict",
            "in.fa",
            "--species",
            "human",
            "-w",
            "8",
            "--max-retries",
            "3",
            "--retry-delay",
            "0.5",
            "-S",
            "method=netmhciipan",
            "-vv",
        ])
        .unwrap();
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.species.as_deref(), Some("human"));
        assert_eq!(args.workers, Some(8));
        assert_eq!(args.max_retries, Some(3));
        assert_eq!(args.retry_delay, Some(0.5));
        assert_eq!(args.set_values, vec!["method=netmhciipan"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["epibind", "-q", "-v", "alleles"]).is_err());
    }
}
