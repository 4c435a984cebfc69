//! Statistics Calculator Module
//! Year filtering, correlation, regressions and the year-over-year t-test.

use crate::config::FilterBounds;
use crate::data::MergedRecord;
use crate::error::{AnalysisError, Result};
use crate::stats::model::{two_sided_t_p, FittedModel};
use log::debug;

/// Significance threshold used when reporting p-values
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// One country's time series and its linear trend.
#[derive(Debug, Clone)]
pub struct Trend {
    /// Records sorted ascending by year.
    pub records: Vec<MergedRecord>,
    pub model: FittedModel,
}

/// Handles statistical calculations on merged records.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Keep one year's records that pass the outlier rules.
    ///
    /// Records are kept when GDP and life expectancy are positive, life
    /// expectancy is above `bounds.life_expectancy_floor` and GDP is below
    /// `bounds.gdp_ceiling`. Filtering an already filtered slice is a no-op.
    pub fn filter_year(records: &[MergedRecord], year: i32, bounds: &FilterBounds) -> Vec<MergedRecord> {
        let slice: Vec<MergedRecord> = records
            .iter()
            .filter(|r| {
                r.year == year
                    && r.gdp_per_capita > 0.0
                    && r.life_expectancy > 0.0
                    && r.life_expectancy > bounds.life_expectancy_floor
                    && r.gdp_per_capita < bounds.gdp_ceiling
            })
            .cloned()
            .collect();
        debug!(
            "Year {} filter kept {} of {} records",
            year,
            slice.len(),
            records.len()
        );
        slice
    }

    /// Pearson correlation between GDP per capita and life expectancy (unlogged).
    ///
    /// Returns `(r, p)` with a two-sided p-value. With exactly two records the
    /// correlation is always ±1 and p is 1.
    pub fn pearson_correlation(slice: &[MergedRecord]) -> Result<(f64, f64)> {
        let n = slice.len();
        if n < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "correlation needs at least 2 records, got {n}"
            )));
        }

        let first = &slice[0];
        if slice.iter().all(|r| r.gdp_per_capita == first.gdp_per_capita)
            || slice.iter().all(|r| r.life_expectancy == first.life_expectancy)
        {
            return Err(AnalysisError::InsufficientData(
                "correlation is undefined for a constant column".to_string(),
            ));
        }

        let nf = n as f64;
        let mean_x = slice.iter().map(|r| r.gdp_per_capita).sum::<f64>() / nf;
        let mean_y = slice.iter().map(|r| r.life_expectancy).sum::<f64>() / nf;

        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for r in slice {
            let dx = r.gdp_per_capita - mean_x;
            let dy = r.life_expectancy - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
        if n == 2 {
            return Ok((r, 1.0));
        }

        let dof = nf - 2.0;
        let denom = 1.0 - r * r;
        let p = if denom <= 0.0 {
            0.0
        } else {
            let t = r * (dof / denom).sqrt();
            two_sided_t_p(t, dof)?
        };
        Ok((r, p))
    }

    /// Fit life expectancy on log10(GDP per capita).
    ///
    /// Precondition: every GDP value is positive, which `filter_year` guarantees.
    pub fn regression_log_gdp(slice: &[MergedRecord]) -> Result<FittedModel> {
        if slice.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "log-GDP regression needs at least 2 records, got {}",
                slice.len()
            )));
        }
        let x: Vec<f64> = slice.iter().map(|r| r.gdp_per_capita.log10()).collect();
        let y: Vec<f64> = slice.iter().map(|r| r.life_expectancy).collect();
        FittedModel::fit(&x, &y)
    }

    /// Restrict to one country and an inclusive year window, then fit life expectancy on year.
    pub fn trend_for_country(
        records: &[MergedRecord],
        country: &str,
        year_lo: i32,
        year_hi: i32,
    ) -> Result<Trend> {
        let mut series: Vec<MergedRecord> = records
            .iter()
            .filter(|r| r.country == country && (year_lo..=year_hi).contains(&r.year))
            .cloned()
            .collect();
        series.sort_by_key(|r| r.year);

        let mut years: Vec<i32> = series.iter().map(|r| r.year).collect();
        years.dedup();
        if years.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "trend for '{country}' in {year_lo}..={year_hi} needs at least 2 distinct years, got {}",
                years.len()
            )));
        }

        let x: Vec<f64> = series.iter().map(|r| f64::from(r.year)).collect();
        let y: Vec<f64> = series.iter().map(|r| r.life_expectancy).collect();
        let model = FittedModel::fit(&x, &y)?;

        Ok(Trend {
            records: series,
            model,
        })
    }

    /// One-sample t-test of consecutive life expectancy differences against zero.
    ///
    /// `sorted` must be ascending by year. Returns `(t, p)`.
    ///
    /// When every difference is the same non-zero value the variance is zero
    /// and the result is `t = ±inf`, `p = 0`. When every difference is zero the
    /// statistic is 0/0 and the call fails with `InsufficientData`.
    pub fn paired_year_over_year_test(sorted: &[MergedRecord]) -> Result<(f64, f64)> {
        let diffs: Vec<f64> = sorted
            .windows(2)
            .map(|w| w[1].life_expectancy - w[0].life_expectancy)
            .collect();

        let n = diffs.len();
        if n < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "year-over-year test needs at least 2 differences, got {n}"
            )));
        }

        let nf = n as f64;
        let mean = diffs.iter().sum::<f64>() / nf;

        if diffs.iter().all(|d| *d == diffs[0]) {
            if diffs[0] == 0.0 {
                return Err(AnalysisError::InsufficientData(
                    "all year-over-year differences are zero".to_string(),
                ));
            }
            let t = if diffs[0] > 0.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
            return Ok((t, 0.0));
        }

        let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (nf - 1.0);
        let t = mean / (variance.sqrt() / nf.sqrt());
        let p = two_sided_t_p(t, nf - 1.0)?;
        Ok((t, p))
    }

    /// Whether a p-value clears the reporting threshold.
    pub fn is_significant(p_value: f64) -> bool {
        p_value <= SIGNIFICANCE_THRESHOLD
    }
}
