//! Stage abstraction and the ordered stage list.

use crate::table::FeatureTable;

/// A column-appending stage. Implementations are pure: the same input table
/// always yields the same output table.
pub trait FeatureStage: Send + Sync + std::fmt::Debug {
    /// Short stage name used in logs.
    fn name(&self) -> &'static str;

    /// Names of the columns this stage appends, in order.
    fn output_columns(&self) -> Vec<String>;

    fn apply(&self, table: FeatureTable) -> FeatureTable;
}

/// Stages applied in insertion order.
#[derive(Debug, Default)]
pub struct TransformPipeline {
    steps: Vec<Box<dyn FeatureStage>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: impl FeatureStage + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn output_columns(&self) -> Vec<String> {
        self.steps.iter().flat_map(|s| s.output_columns()).collect()
    }

    /// Apply every stage in order.
    pub fn apply(&self, mut table: FeatureTable) -> FeatureTable {
        for step in &self.steps {
            tracing::debug!(stage = step.name(), rows = table.len(), "Applying stage");
            table = step.apply(table);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lag::LagGenerator;
    use crate::rolling::RollingWindow;
    use crate::table::test_support::hourly_table;

    #[test]
    fn test_pipeline_applies_in_order() {
        let pipeline = TransformPipeline::new()
            .add_step(LagGenerator::new(vec![1]))
            .add_step(RollingWindow::new(2));
        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline.output_columns(),
            vec!["lag_1", "rolling_avg_2", "rolling_diff_2"]
        );

        let table = pipeline.apply(hourly_table(&[Some(1.0), Some(3.0)]));
        let names: Vec<_> = table.features().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["lag_1", "rolling_avg_2", "rolling_diff_2"]);
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let table = hourly_table(&[Some(1.0)]);
        let pipeline = TransformPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(table.clone()), table);
    }
}
