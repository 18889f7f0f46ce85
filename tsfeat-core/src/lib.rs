//! # tsfeat-core: time-series feature engineering
//!
//! Turns a time-ordered table of raw observations into an analysis-ready
//! feature table for forecasting models:
//!
//! 1. **Calendar decomposition**: parse timestamps, order rows, derive
//!    year/month/day-of-week/hour/day-of-year/ISO-week/quarter/semester.
//! 2. **Resampling** (optional): aggregate to daily or monthly periods.
//! 3. **Lags**: `lag_k` columns holding the target k rows back.
//! 4. **Rolling windows**: complete-window trailing mean and residual.
//! 5. **Flags**: `is_weekend` and month-based `holiday`.
//! 6. **Completeness filter**: drop rows with missing numeric values.
//!
//! Every stage consumes a [`FeatureTable`] and returns a new one; the only
//! rows ever removed are counted in the [`PipelineReport`].

pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod flags;
pub mod lag;
pub mod pipeline;
pub mod resample;
pub mod rolling;
pub mod source;
pub mod split;
pub mod table;
pub mod transform;

// Re-exports
pub use calendar::{CalendarFields, DayOfWeek, Frequency, Month, TimestampParser};
pub use config::{PipelineConfig, load_config};
pub use error::{ConfigError, FeatureError};
pub use pipeline::{FeaturePipeline, PipelineOutput, PipelineReport};
pub use resample::{Aggregation, ResampleConfig};
pub use source::{CsvSource, DataBatch, DataSource};
pub use split::{TrainTestSplit, train_test_split, train_test_split_fraction};
pub use table::{FeatureColumn, FeatureTable, FeatureValues, NumericColumn};
pub use transform::{FeatureStage, TransformPipeline};
