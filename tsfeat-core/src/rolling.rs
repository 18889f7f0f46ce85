//! Trailing rolling-window mean and residual.
//!
//! Only complete windows produce a value: the mean at row i needs rows
//! i - w + 1 ..= i to exist and all be present. A single missing value inside
//! the window makes the result missing rather than being skipped. The window
//! never looks past the current row.

use crate::table::{FeatureColumn, FeatureTable};
use crate::transform::FeatureStage;

/// Appends `rolling_avg_w` and `rolling_diff_w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow {
    window: usize,
}

impl RollingWindow {
    /// `window` is expected to be validated as positive by the config.
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn avg_column(window: usize) -> String {
        format!("rolling_avg_{window}")
    }

    pub fn diff_column(window: usize) -> String {
        format!("rolling_diff_{window}")
    }
}

/// Complete-window trailing mean.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            let start = (i + 1).checked_sub(window)?;
            let sum = values[start..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()?;
            Some(sum / window as f64)
        })
        .collect()
}

/// `value - mean` wherever both are present.
pub fn residual(values: &[Option<f64>], means: &[Option<f64>]) -> Vec<Option<f64>> {
    values
        .iter()
        .zip(means)
        .map(|(v, m)| Some((*v)? - (*m)?))
        .collect()
}

impl FeatureStage for RollingWindow {
    fn name(&self) -> &'static str {
        "rolling"
    }

    fn output_columns(&self) -> Vec<String> {
        vec![Self::avg_column(self.window), Self::diff_column(self.window)]
    }

    fn apply(&self, table: FeatureTable) -> FeatureTable {
        let target = &table.target().values;
        let means = rolling_mean(target, self.window);
        let diffs = residual(target, &means);
        table
            .with_feature(FeatureColumn::numeric(Self::avg_column(self.window), means))
            .with_feature(FeatureColumn::numeric(Self::diff_column(self.window), diffs))
    }
}
