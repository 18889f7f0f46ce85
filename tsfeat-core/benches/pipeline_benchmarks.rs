use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use tsfeat_core::lag::lag;
use tsfeat_core::rolling::rolling_mean;
use tsfeat_core::{DataBatch, FeaturePipeline, PipelineConfig, TimestampParser, export};

fn hourly_batch(hours: usize) -> DataBatch {
    let start = chrono::NaiveDate::from_ymd_opt(2015, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");
    let rows = (0..hours)
        .map(|h| {
            let ts = start + chrono::Duration::hours(h as i64);
            vec![
                json!(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
                json!(format!("{:.1}", 25_000.0 + (h % 24) as f64 * 150.0)),
            ]
        })
        .collect();
    DataBatch::new(vec!["timestamp".into(), "load".into()], rows)
}

fn bench_stages(c: &mut Criterion) {
    let values: Vec<Option<f64>> = (0..35_000).map(|i| Some((i % 97) as f64)).collect();

    c.bench_function("lag_35k_rows", |b| b.iter(|| lag(black_box(&values), 24)));

    c.bench_function("rolling_mean_35k_rows_w24", |b| {
        b.iter(|| rolling_mean(black_box(&values), 24))
    });

    let parser = TimestampParser::new("%Y-%m-%d %H:%M:%S", "Europe/Madrid").expect("valid parser");
    c.bench_function("parse_timestamp", |b| {
        b.iter(|| parser.parse(black_box("2017-06-15 13:00:00")))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let batch = hourly_batch(35_064);
    let pipeline =
        FeaturePipeline::new(PipelineConfig::default(), &batch.columns).expect("valid config");

    c.bench_function("pipeline_run_4_years_hourly", |b| {
        b.iter(|| pipeline.run(black_box(&batch)))
    });

    let output = pipeline.run(&batch).expect("pipeline run");
    c.bench_function("export_csv_4_years_hourly", |b| {
        b.iter(|| export::to_csv_string(black_box(&output.table)))
    });
}

criterion_group!(benches, bench_stages, bench_pipeline);
criterion_main!(benches);
