//! Input tables and the data sources that produce them.

use crate::error::FeatureError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A rectangular batch of raw rows, as handed over by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl DataBatch {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Read a cell as text. Numbers and booleans are rendered, null is `None`.
pub fn cell_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Read a cell as a number. Null, empty strings, `NA`, `NaN`, and anything
/// that does not parse are missing.
pub fn cell_number(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("null") {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Trait for loading data from a source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load data from this source, optionally limiting the number of rows.
    async fn load(&self, limit: Option<usize>) -> Result<DataBatch, FeatureError>;

    /// Human-readable location, used in logs.
    fn describe(&self) -> String;
}

/// CSV file data source. The first line is the header.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: char,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse CSV text already in memory.
    ///
    /// Quoted cells may contain the delimiter, quotes and line breaks. Every
    /// row must have as many cells as the header.
    pub fn parse(&self, content: &str, limit: Option<usize>) -> Result<DataBatch, FeatureError> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                FeatureError::invalid_input(format!(
                    "CSV delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| FeatureError::dataset(e.to_string()))?
            .iter()
            .map(String::from)
            .collect();
        if columns.is_empty() {
            return Err(FeatureError::dataset("Empty CSV file"));
        }

        let mut rows = Vec::new();
        for record in reader.records().take(limit.unwrap_or(usize::MAX)) {
            let record = record.map_err(|e| FeatureError::dataset(e.to_string()))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| serde_json::Value::String(cell.to_string()))
                    .collect(),
            );
        }

        Ok(DataBatch { columns, rows })
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn load(&self, limit: Option<usize>) -> Result<DataBatch, FeatureError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let batch = self.parse(&content, limit)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = batch.row_count(),
            columns = batch.column_count(),
            "Loaded CSV"
        );
        Ok(batch)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
