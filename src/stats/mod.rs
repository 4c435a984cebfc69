//! Stats module - Correlation, regression and trend tests

mod calculator;
mod model;

pub use calculator::{StatsCalculator, Trend, SIGNIFICANCE_THRESHOLD};
pub use model::FittedModel;
