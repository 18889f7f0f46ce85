//! Configuration for the feature pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/tsfeat/config.toml` and/or `.tsfeat/config.toml`
//! in the workspace directory.

use crate::calendar::{DayOfWeek, Frequency, Month, TimestampParser};
use crate::error::ConfigError;
use crate::flags::{default_holiday_months, default_weekend_days};
use crate::resample::ResampleConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Pipeline configuration. Every field has a documented default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the raw timestamp column.
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    /// Target measurement used for lags and rolling statistics.
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Other measurement columns carried through unchanged.
    #[serde(default)]
    pub extra_columns: Vec<String>,
    /// Lag offsets, in output order.
    #[serde(default = "default_lags")]
    pub lags: Vec<usize>,
    /// Rolling window size in periods, including the current row.
    #[serde(default = "default_window")]
    pub window: usize,
    /// chrono format string for the timestamp column.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// IANA timezone name used to interpret and decompose timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Sampling frequency of the input series.
    #[serde(default)]
    pub frequency: Frequency,
    /// Days counted as weekend.
    #[serde(default = "default_weekend_days")]
    pub weekend_days: BTreeSet<DayOfWeek>,
    /// Months flagged as holiday months.
    #[serde(default = "default_holiday_months")]
    pub holiday_months: BTreeSet<Month>,
    /// Optional aggregation to a coarser frequency before feature building.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resample: Option<ResampleConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timestamp_column: default_timestamp_column(),
            target_column: default_target_column(),
            extra_columns: Vec::new(),
            lags: default_lags(),
            window: default_window(),
            timestamp_format: default_timestamp_format(),
            timezone: default_timezone(),
            frequency: Frequency::default(),
            weekend_days: default_weekend_days(),
            holiday_months: default_holiday_months(),
            resample: None,
        }
    }
}

fn default_timestamp_column() -> String {
    "timestamp".to_string()
}

fn default_target_column() -> String {
    "load".to_string()
}

fn default_lags() -> Vec<usize> {
    vec![1, 2, 3, 4, 6, 12]
}

fn default_window() -> usize {
    24
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl PipelineConfig {
    /// Check the settings that do not depend on the input schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window == 0 {
            return Err(ConfigError::InvalidWindow {
                window: self.window,
            });
        }
        if self.lags.is_empty() {
            return Err(ConfigError::NoLags);
        }
        let mut seen = HashSet::new();
        for &lag in &self.lags {
            if lag == 0 {
                return Err(ConfigError::InvalidLag { lag });
            }
            if !seen.insert(lag) {
                return Err(ConfigError::DuplicateLag { lag });
            }
        }
        TimestampParser::new(&self.timestamp_format, &self.timezone)?;

        let mut columns = HashSet::new();
        for name in self.measurement_columns() {
            if name == &self.timestamp_column || !columns.insert(name) {
                return Err(ConfigError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(())
    }

    /// Measurement columns in table order: target first, then extras.
    pub fn measurement_columns(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.target_column).chain(self.extra_columns.iter())
    }

    /// Frequency of the table that reaches the feature stages.
    pub fn effective_frequency(&self) -> Frequency {
        self.resample
            .map(|r| r.frequency)
            .unwrap_or(self.frequency)
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `TSFEAT_`)
/// 3. Explicit config file
/// 4. Workspace-local config (`.tsfeat/config.toml`)
/// 5. User config (`~/.config/tsfeat/config.toml`)
/// 6. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: Option<&PipelineConfig>,
) -> Result<PipelineConfig, ConfigError> {
    let user_config = user_config_path();
    // Environment variables (TSFEAT_TARGET_COLUMN, TSFEAT_RESAMPLE__FREQUENCY, etc.)
    let figment = file_layers(user_config.as_deref(), workspace, config_file)?
        .merge(Env::prefixed("TSFEAT_").split("__"));
    extract_config(figment, overrides)
}

/// Defaults merged with whichever config files exist, lowest priority first.
fn file_layers(
    user_config: Option<&Path>,
    workspace: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));

    if let Some(user_config) = user_config {
        if user_config.exists() {
            figment = figment.merge(Toml::file(user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(ConfigError::Load {
                message: format!("config file not found: {}", path.display()),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    Ok(figment)
}

fn extract_config(
    figment: Figment,
    overrides: Option<&PipelineConfig>,
) -> Result<PipelineConfig, ConfigError> {
    let figment = match overrides {
        Some(overrides) => figment.merge(Serialized::defaults(overrides)),
        None => figment,
    };
    let config: PipelineConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// `~/.config/tsfeat/config.toml` (platform equivalent).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "tsfeat", "tsfeat")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// `<workspace>/.tsfeat/config.toml`.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".tsfeat").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_column, "load");
        assert_eq!(config.lags, vec![1, 2, 3, 4, 6, 12]);
        assert_eq!(config.window, 24);
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.frequency, Frequency::Hourly);
        assert!(config.weekend_days.contains(&DayOfWeek::Sat));
        assert!(config.weekend_days.contains(&DayOfWeek::Sun));
        assert_eq!(config.weekend_days.len(), 2);
        assert_eq!(
            config.holiday_months,
            BTreeSet::from([Month::Jan, Month::Dec])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PipelineConfig {
            window: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidWindow { window: 0 })
        );

        let config = PipelineConfig {
            lags: vec![],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoLags));

        let config = PipelineConfig {
            lags: vec![1, 0],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidLag { lag: 0 }));

        let config = PipelineConfig {
            lags: vec![1, 2, 1],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DuplicateLag { lag: 1 }));

        let config = PipelineConfig {
            timezone: "Nowhere/Special".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownTimezone { .. })
        ));

        let config = PipelineConfig {
            extra_columns: vec!["load".into()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = PipelineConfig {
            resample: Some(ResampleConfig {
                frequency: Frequency::Monthly,
                aggregation: crate::resample::Aggregation::Mean,
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PipelineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.effective_frequency(), Frequency::Monthly);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: PipelineConfig = toml::from_str(
            r#"
target_column = "sales"
lags = [1, 12]
frequency = "monthly"
timestamp_format = "%Y-%m"
holiday_months = ["Nov", "Dec"]
"#,
        )
        .unwrap();
        assert_eq!(parsed.target_column, "sales");
        assert_eq!(parsed.lags, vec![1, 12]);
        assert_eq!(parsed.window, 24);
        assert_eq!(parsed.frequency, Frequency::Monthly);
        assert_eq!(parsed.holiday_months, BTreeSet::from([Month::Nov, Month::Dec]));
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_workspace_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "window = 7\nlags = [7, 14]\n").unwrap();

        let figment = file_layers(None, Some(dir.path()), None).unwrap();
        let config = extract_config(figment, None).unwrap();
        assert_eq!(config.window, 7);
        assert_eq!(config.lags, vec![7, 14]);
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "window = 0\n").unwrap();
        let figment = file_layers(None, None, Some(&path)).unwrap();
        assert_eq!(
            extract_config(figment, None).unwrap_err(),
            ConfigError::InvalidWindow { window: 0 }
        );

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            file_layers(None, None, Some(&missing)),
            Err(ConfigError::Load { .. })
        ));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = PipelineConfig {
            target_column: "passengers".into(),
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = workspace_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "target_column = \"load\"\nwindow = 7\n").unwrap();

        let figment = file_layers(None, Some(dir.path()), None).unwrap();
        let config = extract_config(figment, Some(&overrides)).unwrap();
        assert_eq!(config.target_column, "passengers");
    }

    #[test]
    fn test_user_layer_below_workspace_layer() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.toml");
        std::fs::write(&user, "window = 48\ntarget_column = \"sales\"\n").unwrap();
        let ws = workspace_config_path(dir.path());
        std::fs::create_dir_all(ws.parent().unwrap()).unwrap();
        std::fs::write(&ws, "window = 12\n").unwrap();

        let figment = file_layers(Some(&user), Some(dir.path()), None).unwrap();
        let config = extract_config(figment, None).unwrap();
        assert_eq!(config.window, 12);
        assert_eq!(config.target_column, "sales");
    }
}
