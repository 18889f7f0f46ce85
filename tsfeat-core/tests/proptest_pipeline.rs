//! Property-based tests for the feature stages using proptest.

use proptest::prelude::*;
use serde_json::json;
use tsfeat_core::lag::lag;
use tsfeat_core::rolling::{residual, rolling_mean};
use tsfeat_core::{DataBatch, FeaturePipeline, PipelineConfig};

fn series() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop_oneof![4 => (-1000.0f64..1000.0).prop_map(Some), 1 => Just(None)],
        0..60,
    )
}

// --- Lag properties ---

proptest! {
    #[test]
    fn lag_matches_positional_shift(values in series(), k in 1usize..10) {
        let lagged = lag(&values, k);
        prop_assert_eq!(lagged.len(), values.len());
        for i in 0..values.len() {
            if i < k {
                prop_assert!(lagged[i].is_none());
            } else {
                prop_assert_eq!(lagged[i], values[i - k]);
            }
        }
    }
}

// --- Rolling window properties ---

proptest! {
    #[test]
    fn rolling_mean_is_exact_complete_window_mean(values in series(), w in 1usize..8) {
        let means = rolling_mean(&values, w);
        prop_assert_eq!(means.len(), values.len());
        for i in 0..values.len() {
            if i + 1 < w {
                prop_assert!(means[i].is_none());
                continue;
            }
            let window = &values[i + 1 - w..=i];
            if window.iter().any(Option::is_none) {
                prop_assert!(means[i].is_none());
            } else {
                let expected = window.iter().flatten().sum::<f64>() / w as f64;
                let got = means[i].unwrap();
                prop_assert!((got - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn residual_is_value_minus_mean(values in series(), w in 1usize..8) {
        let means = rolling_mean(&values, w);
        let diffs = residual(&values, &means);
        for i in 0..values.len() {
            match (values[i], means[i]) {
                (Some(v), Some(m)) => prop_assert_eq!(diffs[i], Some(v - m)),
                _ => prop_assert!(diffs[i].is_none()),
            }
        }
    }

    #[test]
    fn rolling_mean_ignores_future_values(
        values in series(),
        w in 1usize..8,
        replacement in -1000.0f64..1000.0,
    ) {
        prop_assume!(!values.is_empty());
        let mut changed = values.clone();
        let last = changed.len() - 1;
        changed[last] = Some(replacement);
        let a = rolling_mean(&values, w);
        let b = rolling_mean(&changed, w);
        prop_assert_eq!(&a[..last], &b[..last]);
    }
}

// --- Whole pipeline properties ---

fn hourly_rows() -> impl Strategy<Value = Vec<(u32, f64)>> {
    prop::collection::vec((0u32..500, -100.0f64..100.0), 0..80)
}

fn to_batch(rows: &[(u32, f64)]) -> DataBatch {
    let rows = rows
        .iter()
        .map(|(hour, value)| {
            let day = 1 + hour / 24;
            vec![
                json!(format!("2016-03-{day:02} {:02}:00:00", hour % 24)),
                json!(value),
            ]
        })
        .collect();
    DataBatch::new(vec!["timestamp".into(), "load".into()], rows)
}

proptest! {
    #[test]
    fn pipeline_output_strictly_ascending_and_deterministic(rows in hourly_rows()) {
        let config = PipelineConfig {
            lags: vec![1, 3],
            window: 4,
            ..Default::default()
        };
        let batch = to_batch(&rows);
        let pipeline = FeaturePipeline::new(config, &batch.columns).unwrap();
        let first = pipeline.run(&batch).unwrap();
        let second = pipeline.run(&batch).unwrap();

        let ts = first.table.timestamps();
        prop_assert!(ts.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(&first.table, &second.table);

        let report = first.report;
        prop_assert_eq!(
            report.input_rows,
            report.parse_failures
                + report.duplicates_dropped
                + report.incomplete_rows_dropped
                + report.output_rows
        );
    }
}
