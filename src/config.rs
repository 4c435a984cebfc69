//! Analysis Configuration
//! Run parameters with the historical defaults kept as named constants.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "LIFEGDP_CONFIG";

pub const DEFAULT_TARGET_YEAR: i32 = 2020;
pub const DEFAULT_LIFE_EXPECTANCY_FLOOR: f64 = 10.0;
pub const DEFAULT_GDP_CEILING: f64 = 1e6;
pub const DEFAULT_TREND_COUNTRY: &str = "Czech Republic";
pub const DEFAULT_TREND_START: i32 = 2000;
pub const DEFAULT_TREND_END: i32 = 2020;

/// Outlier bounds applied by the year filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterBounds {
    /// Rows with life expectancy at or below this are dropped.
    pub life_expectancy_floor: f64,
    /// Rows with GDP per capita at or above this are dropped.
    pub gdp_ceiling: f64,
}

impl Default for FilterBounds {
    fn default() -> Self {
        Self {
            life_expectancy_floor: DEFAULT_LIFE_EXPECTANCY_FLOOR,
            gdp_ceiling: DEFAULT_GDP_CEILING,
        }
    }
}

/// Everything the default pipeline needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub life_path: PathBuf,
    pub gdp_path: PathBuf,
    pub results_dir: PathBuf,
    pub target_year: i32,
    pub bounds: FilterBounds,
    pub trend_country: String,
    pub trend_start: i32,
    pub trend_end: i32,
    pub scatter_file: String,
    pub regression_file: String,
    pub trend_file: String,
    pub summary_file: String,
    /// Country -> RGB colour. Empty means no country is highlighted.
    pub highlights: BTreeMap<String, [u8; 3]>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            life_path: PathBuf::from("data/lex.csv"),
            gdp_path: PathBuf::from("data/gdp_pcap.csv"),
            results_dir: PathBuf::from("results"),
            target_year: DEFAULT_TARGET_YEAR,
            bounds: FilterBounds::default(),
            trend_country: DEFAULT_TREND_COUNTRY.to_string(),
            trend_start: DEFAULT_TREND_START,
            trend_end: DEFAULT_TREND_END,
            scatter_file: "scatter_2020.png".to_string(),
            regression_file: "regression_2020.png".to_string(),
            trend_file: "trend_czech.png".to_string(),
            summary_file: "summary.json".to_string(),
            highlights: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Load a JSON configuration file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AnalysisError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Use the file named by `LIFEGDP_CONFIG` if set, otherwise the defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_json_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.trend_start > self.trend_end {
            return Err(AnalysisError::Config(format!(
                "trend window {}..={} is empty",
                self.trend_start, self.trend_end
            )));
        }
        if self.bounds.gdp_ceiling.is_nan() || self.bounds.gdp_ceiling <= 0.0 {
            return Err(AnalysisError::Config(
                "gdp_ceiling must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scatter_path(&self) -> PathBuf {
        self.results_dir.join(&self.scatter_file)
    }

    pub fn regression_path(&self) -> PathBuf {
        self.results_dir.join(&self.regression_file)
    }

    pub fn trend_path(&self) -> PathBuf {
        self.results_dir.join(&self.trend_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.results_dir.join(&self.summary_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_historical_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.target_year, 2020);
        assert_eq!(config.bounds.life_expectancy_floor, 10.0);
        assert_eq!(config.bounds.gdp_ceiling, 1e6);
        assert_eq!(config.trend_country, "Czech Republic");
        assert_eq!((config.trend_start, config.trend_end), (2000, 2020));
        assert!(config.highlights.is_empty());
        assert_eq!(config.summary_path(), PathBuf::from("results/summary.json"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"target_year": 2015, "bounds": {{"gdp_ceiling": 5e5}}, "highlights": {{"Chad": [255, 0, 0]}}}}"#
        )
        .unwrap();

        let config = AnalysisConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.target_year, 2015);
        assert_eq!(config.bounds.gdp_ceiling, 5e5);
        assert_eq!(config.bounds.life_expectancy_floor, 10.0);
        assert_eq!(config.highlights.get("Chad"), Some(&[255, 0, 0]));
        assert_eq!(config.trend_country, "Czech Republic");
    }

    #[test]
    fn malformed_json_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            AnalysisConfig::from_json_file(file.path()),
            Err(AnalysisError::Config(_))
        ));
    }

    #[test]
    fn inverted_trend_window_is_rejected() {
        let config = AnalysisConfig {
            trend_start: 2020,
            trend_end: 2000,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn missing_config_file_is_not_found() {
        let err = AnalysisConfig::from_json_file(Path::new("/nonexistent/lifegdp.json"));
        assert!(matches!(err, Err(AnalysisError::NotFound(_))));
    }
}
