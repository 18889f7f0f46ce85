//! tsfeat CLI: build forecasting feature tables from time-series CSV files.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// tsfeat: calendar, lag, and rolling-window features for time series
#[derive(Parser, Debug)]
#[command(name = "tsfeat", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (searched for .tsfeat/config.toml)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the feature pipeline over a CSV file
    Run(RunArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print the output column set for the current configuration
    Columns,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Input CSV file (first line is the header)
    input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// CSV field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Only read the first N data rows
    #[arg(long)]
    limit: Option<usize>,

    /// Target column (overrides config)
    #[arg(short, long)]
    target: Option<String>,

    /// Timestamp column (overrides config)
    #[arg(long)]
    timestamp_column: Option<String>,

    /// Comma-separated lag offsets, e.g. 1,2,24 (overrides config)
    #[arg(long, value_delimiter = ',')]
    lags: Option<Vec<usize>>,

    /// Rolling window size (overrides config)
    #[arg(long)]
    window: Option<usize>,

    /// Hold out the last N rows as a test set, written next to the output
    #[arg(long)]
    test_size: Option<usize>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "tsfeat", "tsfeat")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tsfeat.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::parse_from([
            "tsfeat",
            "run",
            "energy.csv",
            "--lags",
            "1,2,24",
            "--window",
            "24",
            "-f",
            "json",
            "--test-size",
            "48",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.lags, Some(vec![1, 2, 24]));
                assert_eq!(args.window, Some(24));
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.test_size, Some(48));
                assert_eq!(args.input, PathBuf::from("energy.csv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
