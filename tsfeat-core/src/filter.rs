//! Removal of rows with missing numeric values.

use crate::table::FeatureTable;

/// Outcome of the completeness filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub table: FeatureTable,
    pub dropped: usize,
}

/// Drops every row in which any measurement or numeric feature is missing.
/// Flag columns are always defined and never cause a drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessFilter;

impl CompletenessFilter {
    pub fn apply(&self, table: FeatureTable) -> FilterOutcome {
        let keep: Vec<bool> = (0..table.len()).map(|i| table.row_is_complete(i)).collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped == 0 {
            return FilterOutcome { table, dropped };
        }
        FilterOutcome {
            table: table.retain_rows(&keep),
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lag::LagGenerator;
    use crate::table::test_support::hourly_table;
    use crate::transform::FeatureStage;

    #[test]
    fn test_drops_head_rows_with_missing_lags() {
        let table = LagGenerator::new(vec![2]).apply(hourly_table(&[
            Some(1.0),
            Some(2.0),
            Some(3.0),
            Some(4.0),
        ]));
        let outcome = CompletenessFilter.apply(table);
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.table.len(), 2);
        assert_eq!(
            outcome.table.numeric("lag_2"),
            Some(&[Some(1.0), Some(2.0)][..])
        );
    }

    #[test]
    fn test_missing_measurement_drops_row() {
        let outcome = CompletenessFilter.apply(hourly_table(&[Some(1.0), None, Some(3.0)]));
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.table.target().values, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_complete_table_untouched() {
        let table = hourly_table(&[Some(1.0), Some(2.0)]);
        let outcome = CompletenessFilter.apply(table.clone());
        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.table, table);
    }
}
