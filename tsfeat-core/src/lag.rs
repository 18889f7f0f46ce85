//! Lag features.
//!
//! `lag_k` at row i is the target value at row i - k. Offsets are positional:
//! the table is assumed to be evenly spaced once ordered. The first k rows have
//! no lag and stay missing; this stage never drops rows.

use crate::table::{FeatureColumn, FeatureTable};
use crate::transform::FeatureStage;

/// Appends one `lag_k` column per configured offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagGenerator {
    offsets: Vec<usize>,
}

impl LagGenerator {
    /// Offsets are expected to be validated (positive, unique) by the config.
    pub fn new(offsets: Vec<usize>) -> Self {
        Self { offsets }
    }

    pub fn column_name(offset: usize) -> String {
        format!("lag_{offset}")
    }
}

/// Shift `values` back by `offset` positions.
pub fn lag(values: &[Option<f64>], offset: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(offset).and_then(|j| values[j]))
        .collect()
}

impl FeatureStage for LagGenerator {
    fn name(&self) -> &'static str {
        "lag"
    }

    fn output_columns(&self) -> Vec<String> {
        self.offsets.iter().map(|&k| Self::column_name(k)).collect()
    }

    fn apply(&self, table: FeatureTable) -> FeatureTable {
        let columns: Vec<_> = self
            .offsets
            .iter()
            .map(|&k| FeatureColumn::numeric(Self::column_name(k), lag(&table.target().values, k)))
            .collect();
        columns
            .into_iter()
            .fold(table, |table, column| table.with_feature(column))
    }
}
