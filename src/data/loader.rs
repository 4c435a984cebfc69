//! CSV Data Loader Module
//! Reads the raw wide-format tables from disk using Polars.

use crate::error::{AnalysisError, Result};
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Identifier column shared by both wide tables.
pub const COUNTRY_COLUMN: &str = "country";

/// A wide table: one row per country, one text column per year.
#[derive(Debug, Clone)]
pub struct RawTable {
    df: DataFrame,
}

impl RawTable {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Labels of every column except the country identifier.
    pub fn value_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| name != COUNTRY_COLUMN)
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }
}

/// Load a wide CSV with every cell kept as raw text.
///
/// Schema inference is disabled so GDP cells like `"27.7k"` reach the
/// transformer untouched; numeric coercion happens there.
pub fn load_raw_table(path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        return Err(AnalysisError::NotFound(path.to_path_buf()));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    info!(
        "Loaded {}: {} rows x {} columns",
        path.display(),
        df.height(),
        df.width()
    );

    Ok(RawTable::new(df))
}

/// Handles loading of the life expectancy and GDP per capita tables.
pub struct DataLoader {
    life_path: PathBuf,
    gdp_path: PathBuf,
}

impl DataLoader {
    pub fn new(life_path: impl Into<PathBuf>, gdp_path: impl Into<PathBuf>) -> Self {
        Self {
            life_path: life_path.into(),
            gdp_path: gdp_path.into(),
        }
    }

    pub fn load_life_expectancy(&self) -> Result<RawTable> {
        load_raw_table(&self.life_path)
    }

    pub fn load_gdp_per_capita(&self) -> Result<RawTable> {
        load_raw_table(&self.gdp_path)
    }
}
