//! LifeGDP - Life Expectancy vs. GDP per Capita Analysis
//!
//! Reads two wide-format country/year CSV tables, melts and cleans them,
//! joins them on (country, year) and runs the correlation, regression and
//! trend analyses, rendering the results as PNG charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod stats;

pub use config::{AnalysisConfig, FilterBounds};
pub use error::{AnalysisError, Result};
pub use pipeline::{AnalysisSummary, Pipeline};
