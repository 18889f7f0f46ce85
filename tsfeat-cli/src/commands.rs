//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::OutputFormat;
use crate::RunArgs;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tsfeat_core::config::workspace_config_path;
use tsfeat_core::{
    CsvSource, DataSource, FeaturePipeline, FeatureTable, PipelineConfig, export,
    train_test_split,
};

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => handle_run(args, workspace, config_file).await,
        Commands::Config { action } => handle_config(action, workspace, config_file),
        Commands::Columns => handle_columns(workspace, config_file),
    }
}

fn load(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    tsfeat_core::load_config(Some(workspace), config_file, None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(mut config: PipelineConfig, args: &RunArgs) -> PipelineConfig {
    if let Some(target) = &args.target {
        config.target_column = target.clone();
    }
    if let Some(column) = &args.timestamp_column {
        config.timestamp_column = column.clone();
    }
    if let Some(lags) = &args.lags {
        config.lags = lags.clone();
    }
    if let Some(window) = args.window {
        config.window = window;
    }
    config
}

/// `out.csv` -> `out.test.csv`
fn sibling_path(path: &Path, tag: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "features".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{tag}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{tag}"),
    };
    path.with_file_name(name)
}

fn write_table(
    table: &FeatureTable,
    format: OutputFormat,
    writer: impl Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => export::write_csv(table, writer)?,
        OutputFormat::Json => export::write_json(table, writer)?,
    }
    Ok(())
}

fn write_to_file(table: &FeatureTable, format: OutputFormat, path: &Path) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_table(table, format, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = table.len(), "Wrote feature table");
    Ok(())
}

async fn handle_run(
    args: RunArgs,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load(workspace, config_file)?;
    run_pipeline(config, args).await
}

/// Run `args` against an already-resolved configuration.
async fn run_pipeline(config: PipelineConfig, args: RunArgs) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args);

    let source = CsvSource::new(&args.input).with_delimiter(args.delimiter);
    let batch = source
        .load(args.limit)
        .await
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    let pipeline = FeaturePipeline::new(config, &batch.columns)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    let output = pipeline.run(&batch)?;

    let report = &output.report;
    tracing::info!(
        input = report.input_rows,
        parse_failures = report.parse_failures,
        duplicates = report.duplicates_dropped,
        incomplete = report.incomplete_rows_dropped,
        output = report.output_rows,
        "Pipeline report"
    );

    match (args.test_size, &args.output) {
        (Some(test_size), Some(path)) => {
            let split = train_test_split(&output.table, test_size)?;
            write_to_file(&split.train, args.format, &sibling_path(path, "train"))?;
            write_to_file(&split.test, args.format, &sibling_path(path, "test"))?;
        }
        (Some(_), None) => {
            anyhow::bail!("--test-size requires --output so train and test files can be written");
        }
        (None, Some(path)) => write_to_file(&output.table, args.format, path)?,
        (None, None) => {
            let stdout = std::io::stdout();
            write_table(&output.table, args.format, stdout.lock())?;
        }
    }
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = toml::to_string_pretty(&PipelineConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load(workspace, config_file)?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn handle_columns(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<()> {
    let config = load(workspace, config_file)?;
    let schema: Vec<String> = std::iter::once(config.timestamp_column.clone())
        .chain(config.measurement_columns().cloned())
        .collect();
    let pipeline = FeaturePipeline::new(config, &schema)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    for name in pipeline.output_columns() {
        println!("{name}");
    }
    Ok(())
}
