//! Writing a feature table out as CSV or JSON records.
//!
//! Column order matches [`FeatureTable::column_names`]. Timestamps are
//! RFC 3339 in the table's zone, categorical fields use their fixed labels,
//! flags are written as 0/1, and missing numbers are empty cells (CSV) or
//! `null` (JSON).

use crate::calendar::CalendarFields;
use crate::error::FeatureError;
use crate::table::{FeatureTable, FeatureValues};
use serde_json::{Map, Value, json};
use std::io::Write;

fn calendar_values(fields: &CalendarFields, with_hour: bool) -> Vec<Value> {
    let mut values = vec![
        json!(fields.year),
        json!(fields.month.label()),
        json!(fields.day_of_week.label()),
    ];
    if with_hour {
        values.push(json!(fields.hour));
    }
    values.extend([
        json!(fields.day_of_year),
        json!(fields.week_of_year),
        json!(fields.quarter),
        json!(fields.semester),
    ]);
    values
}

/// Row `idx` as JSON values in export column order.
fn row_values(table: &FeatureTable, idx: usize) -> Vec<Value> {
    let mut row = vec![json!(table.timestamps()[idx].to_rfc3339())];
    row.extend(calendar_values(
        &table.calendar()[idx],
        table.frequency().is_sub_daily(),
    ));
    row.extend(table.measurements().iter().map(|c| json!(c.values[idx])));
    row.extend(table.features().iter().map(|f| match &f.values {
        FeatureValues::Numeric(v) => json!(v[idx]),
        FeatureValues::Flag(v) => json!(u8::from(v[idx])),
    }));
    row
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write `table` as CSV with a header row. Fields containing the delimiter,
/// quotes or line breaks are quoted.
pub fn write_csv<W: Write>(table: &FeatureTable, writer: W) -> Result<(), FeatureError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.column_names())?;
    for idx in 0..table.len() {
        csv_writer.write_record(row_values(table, idx).iter().map(csv_cell))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render `table` as CSV text.
pub fn to_csv_string(table: &FeatureTable) -> Result<String, FeatureError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| FeatureError::invalid_input(e.to_string()))
}

/// Render `table` as an array of JSON objects keyed by column name.
pub fn to_json_records(table: &FeatureTable) -> Value {
    let names = table.column_names();
    let records = (0..table.len())
        .map(|idx| {
            let record: Map<String, Value> = names
                .iter()
                .cloned()
                .zip(row_values(table, idx))
                .collect();
            Value::Object(record)
        })
        .collect();
    Value::Array(records)
}

/// Write `table` as pretty-printed JSON records.
pub fn write_json<W: Write>(table: &FeatureTable, mut writer: W) -> Result<(), FeatureError> {
    serde_json::to_writer_pretty(&mut writer, &to_json_records(table))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
