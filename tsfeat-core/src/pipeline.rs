//! The feature pipeline: decomposition, optional resampling, feature stages,
//! and the completeness filter, run as a single forward pass.

use crate::calendar::{RawObservation, TimestampDecomposer, TimestampParser};
use crate::config::PipelineConfig;
use crate::error::{ConfigError, FeatureError};
use crate::filter::CompletenessFilter;
use crate::flags::{FlagDeriver, HolidayPredicate, WeekendPredicate};
use crate::lag::LagGenerator;
use crate::resample::Resampler;
use crate::rolling::RollingWindow;
use crate::source::{DataBatch, cell_number, cell_text};
use crate::table::FeatureTable;
use crate::transform::TransformPipeline;
use serde::{Deserialize, Serialize};

/// Row accounting for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub input_rows: usize,
    /// Rows whose timestamp did not parse under the configured format.
    pub parse_failures: usize,
    /// Rows repeating an instant already seen.
    pub duplicates_dropped: usize,
    /// Row count before resampling, when resampling ran.
    pub resampled_from: Option<usize>,
    /// Rows removed because a numeric value was missing.
    pub incomplete_rows_dropped: usize,
    pub output_rows: usize,
}

/// Result of [`FeaturePipeline::run`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: FeatureTable,
    pub report: PipelineReport,
}

/// A configured pipeline bound to one input schema.
#[derive(Debug)]
pub struct FeaturePipeline {
    config: PipelineConfig,
    schema: Vec<String>,
    timestamp_idx: usize,
    measurement_idx: Vec<usize>,
    measurement_names: Vec<String>,
    decomposer: TimestampDecomposer,
    resampler: Option<Resampler>,
    stages: TransformPipeline,
}

impl FeaturePipeline {
    /// Validate `config` and bind it to the input column names.
    ///
    /// Fails if any setting is invalid or a configured column is missing from
    /// `schema`; no pipeline exists in that case.
    pub fn new(config: PipelineConfig, schema: &[String]) -> Result<Self, ConfigError> {
        config.validate()?;

        let find = |role: &'static str, name: &String| {
            schema
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ConfigError::UnknownColumn {
                    role,
                    name: name.clone(),
                })
        };

        let timestamp_idx = find("timestamp", &config.timestamp_column)?;
        let measurement_idx = std::iter::once(find("target", &config.target_column))
            .chain(config.extra_columns.iter().map(|c| find("measurement", c)))
            .collect::<Result<Vec<_>, _>>()?;
        let measurement_names = config.measurement_columns().cloned().collect();

        let parser = TimestampParser::new(&config.timestamp_format, &config.timezone)?;
        let decomposer = TimestampDecomposer::new(parser, config.frequency);
        let resampler = config.resample.map(Resampler::new);

        let stages = TransformPipeline::new()
            .add_step(LagGenerator::new(config.lags.clone()))
            .add_step(RollingWindow::new(config.window))
            .add_step(FlagDeriver::new(
                WeekendPredicate::new(config.weekend_days.clone()),
                HolidayPredicate::new(config.holiday_months.clone()),
            ));

        Ok(Self {
            config,
            schema: schema.to_vec(),
            timestamp_idx,
            measurement_idx,
            measurement_names,
            decomposer,
            resampler,
            stages,
        })
    }

    /// Column names of the table `run` produces, in export order.
    pub fn output_columns(&self) -> Vec<String> {
        let mut names = vec!["timestamp".to_string()];
        names.extend(["year", "month", "day_of_week"].map(String::from));
        if self.config.effective_frequency().is_sub_daily() {
            names.push("hour".to_string());
        }
        names.extend(["day_of_year", "week_of_year", "quarter", "semester"].map(String::from));
        names.extend(self.measurement_names.iter().cloned());
        names.extend(self.stages.output_columns());
        names
    }

    fn extract(&self, batch: &DataBatch) -> Vec<RawObservation> {
        batch
            .rows
            .iter()
            .map(|row| RawObservation {
                timestamp: row
                    .get(self.timestamp_idx)
                    .and_then(cell_text)
                    .unwrap_or_default(),
                values: self
                    .measurement_idx
                    .iter()
                    .map(|&idx| row.get(idx).and_then(cell_number))
                    .collect(),
            })
            .collect()
    }

    /// Run every stage over `batch` and return the filtered feature table.
    pub fn run(&self, batch: &DataBatch) -> Result<PipelineOutput, FeatureError> {
        if batch.columns != self.schema {
            return Err(FeatureError::SchemaMismatch {
                expected: self.schema.clone(),
                actual: batch.columns.clone(),
            });
        }

        let mut report = PipelineReport {
            input_rows: batch.row_count(),
            ..Default::default()
        };

        let observations = self.extract(batch);
        let decomposed = self
            .decomposer
            .decompose(&self.measurement_names, &observations);
        report.parse_failures = decomposed.parse_failures;
        report.duplicates_dropped = decomposed.duplicates_dropped;
        if decomposed.parse_failures > 0 {
            tracing::warn!(
                dropped = decomposed.parse_failures,
                format = %self.config.timestamp_format,
                "Dropped rows with unparseable timestamps"
            );
        }
        if decomposed.duplicates_dropped > 0 {
            tracing::warn!(
                dropped = decomposed.duplicates_dropped,
                "Dropped rows with duplicate timestamps"
            );
        }

        let mut table = decomposed.table;
        if let Some(resampler) = &self.resampler {
            report.resampled_from = Some(table.len());
            table = resampler.apply(table);
        }

        let table = self.stages.apply(table);
        let filtered = CompletenessFilter.apply(table);
        report.incomplete_rows_dropped = filtered.dropped;
        report.output_rows = filtered.table.len();

        tracing::info!(
            input = report.input_rows,
            output = report.output_rows,
            parse_failures = report.parse_failures,
            incomplete = report.incomplete_rows_dropped,
            "Feature pipeline complete"
        );

        Ok(PipelineOutput {
            table: filtered.table,
            report,
        })
    }
}
