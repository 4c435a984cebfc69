//! Data Processor Module
//! Reshapes wide tables to long form, cleans GDP cells and joins the two datasets.

use crate::data::loader::{RawTable, COUNTRY_COLUMN};
use crate::error::{AnalysisError, Result};
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// One (country, year) observation from a melted table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub country: String,
    pub year: i32,
    pub value: f64,
}

/// One row of the inner join of the life expectancy and GDP tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub country: String,
    pub year: i32,
    pub life_expectancy: f64,
    pub gdp_per_capita: f64,
}

/// Result of cleaning a single raw GDP cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GdpCell {
    Value(f64),
    Missing,
}

impl GdpCell {
    pub fn value(self) -> Option<f64> {
        match self {
            GdpCell::Value(v) => Some(v),
            GdpCell::Missing => None,
        }
    }

    fn parse(text: &str, scale: f64) -> Self {
        match text.replace(',', "").trim().parse::<f64>() {
            Ok(v) if (v * scale).is_finite() => GdpCell::Value(v * scale),
            _ => GdpCell::Missing,
        }
    }
}

/// Handles the wide-to-long reshape, cell cleaning and merge.
pub struct DataProcessor;

impl DataProcessor {
    /// Melt life expectancy to long form, keeping only present finite numeric cells.
    pub fn melt_life_expectancy(table: &RawTable) -> Result<Vec<LongRecord>> {
        let records = Self::melt_with(table, |values| {
            let numeric = values.cast(&DataType::Float64)?;
            Ok(numeric
                .f64()?
                .into_iter()
                .map(|v| v.filter(|v| v.is_finite()))
                .collect())
        })?;
        debug!("Melted life expectancy into {} records", records.len());
        Ok(records)
    }

    /// Convert a raw GDP cell such as `"27.7k"`, `"5380"` or `"1,234"` into USD.
    ///
    /// Never fails: anything that does not parse is `GdpCell::Missing`.
    /// Scientific notation is accepted (`"1e6k"` is 1e9); non-finite values
    /// (`"nan"`, `"inf"`) are missing.
    pub fn clean_gdp_cell(raw: Option<&str>) -> GdpCell {
        let Some(raw) = raw else {
            return GdpCell::Missing;
        };
        let s = raw.trim();
        match s.strip_suffix(['k', 'K']) {
            Some(thousands) => GdpCell::parse(thousands.trim(), 1000.0),
            None => GdpCell::parse(s, 1.0),
        }
    }

    /// Melt GDP per capita to long form, cleaning every cell and dropping missing ones.
    pub fn melt_gdp_per_capita(table: &RawTable) -> Result<Vec<LongRecord>> {
        let records = Self::melt_with(table, |values| {
            let text = values.cast(&DataType::String)?;
            Ok(text
                .str()?
                .into_iter()
                .map(|raw| Self::clean_gdp_cell(raw).value())
                .collect())
        })?;
        debug!("Melted GDP per capita into {} records", records.len());
        Ok(records)
    }

    /// Inner join on exact (country, year).
    ///
    /// A key repeated in either input yields the cross product of its matches.
    /// Output follows the order of `life_long`; callers should not rely on it.
    pub fn merge_datasets(life_long: &[LongRecord], gdp_long: &[LongRecord]) -> Vec<MergedRecord> {
        let mut gdp_index: HashMap<(&str, i32), Vec<f64>> = HashMap::new();
        for rec in gdp_long {
            gdp_index
                .entry((rec.country.as_str(), rec.year))
                .or_default()
                .push(rec.value);
        }

        let merged: Vec<MergedRecord> = life_long
            .iter()
            .flat_map(|life| {
                gdp_index
                    .get(&(life.country.as_str(), life.year))
                    .into_iter()
                    .flatten()
                    .map(move |&gdp| MergedRecord {
                        country: life.country.clone(),
                        year: life.year,
                        life_expectancy: life.value,
                        gdp_per_capita: gdp,
                    })
            })
            .collect();

        debug!(
            "Merged {} life and {} GDP records into {}",
            life_long.len(),
            gdp_long.len(),
            merged.len()
        );
        merged
    }

    /// Shared melt: year columns in file order, rows in file order within each.
    ///
    /// `cells` converts one year column into per-row values, `None` for cells to drop.
    fn melt_with<F>(table: &RawTable, mut cells: F) -> Result<Vec<LongRecord>>
    where
        F: FnMut(&Series) -> PolarsResult<Vec<Option<f64>>>,
    {
        let df = table.dataframe();
        let country_col = df.column(COUNTRY_COLUMN).map_err(|_| {
            AnalysisError::ParseError(format!("table has no '{COUNTRY_COLUMN}' column"))
        })?;
        let countries = country_col
            .as_materialized_series()
            .cast(&DataType::String)?;
        let countries = countries.str()?;

        let mut records = Vec::new();
        for name in table.value_columns() {
            let year = Self::parse_year(&name)?;
            let values = cells(df.column(&name)?.as_materialized_series())?;

            for (country, value) in countries.into_iter().zip(values) {
                if let (Some(country), Some(value)) = (country, value) {
                    records.push(LongRecord {
                        country: country.to_string(),
                        year,
                        value,
                    });
                }
            }
        }
        Ok(records)
    }

    fn parse_year(label: &str) -> Result<i32> {
        label.trim().parse::<i32>().map_err(|_| {
            AnalysisError::ParseError(format!("year column label '{label}' is not an integer"))
        })
    }
}
