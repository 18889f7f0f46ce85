//! Chronological train/test split.
//!
//! The test set is always the tail of the table so that no training row comes
//! after a test row.

use crate::error::FeatureError;
use crate::table::FeatureTable;

/// A train/test pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: FeatureTable,
    pub test: FeatureTable,
}

/// Hold out the last `test_size` rows.
pub fn train_test_split(
    table: &FeatureTable,
    test_size: usize,
) -> Result<TrainTestSplit, FeatureError> {
    if test_size > table.len() {
        return Err(FeatureError::invalid_input(format!(
            "test size {test_size} exceeds table length {}",
            table.len()
        )));
    }
    let cut = table.len() - test_size;
    Ok(TrainTestSplit {
        train: table.slice(0..cut),
        test: table.slice(cut..table.len()),
    })
}

/// Hold out the trailing `fraction` of rows, rounded up.
pub fn train_test_split_fraction(
    table: &FeatureTable,
    fraction: f64,
) -> Result<TrainTestSplit, FeatureError> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(FeatureError::invalid_input(format!(
            "test fraction must be in (0, 1), got {fraction}"
        )));
    }
    let test_size = (table.len() as f64 * fraction).ceil() as usize;
    train_test_split(table, test_size)
}
