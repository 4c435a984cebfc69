//! Ordinary Least Squares Module
//! Simple affine fit `y = a + b·x` with coefficient inference.

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

/// Result of a simple OLS fit. Never mutated after fitting.
#[derive(Debug, Clone, Serialize)]
pub struct FittedModel {
    pub intercept: f64,
    pub slope: f64,
    /// Standard errors and p-values need at least one residual degree of freedom.
    pub intercept_std_err: Option<f64>,
    pub slope_std_err: Option<f64>,
    pub intercept_p_value: Option<f64>,
    pub slope_p_value: Option<f64>,
    pub r_squared: f64,
    pub n_obs: usize,
    #[serde(skip)]
    pub fitted_values: Vec<f64>,
    #[serde(skip)]
    pub residuals: Vec<f64>,
}

impl FittedModel {
    /// Fit `y` on `x` by least squares.
    ///
    /// Fails with `InsufficientData` for fewer than 2 points or a constant `x`.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        let n = x.len();
        if n != y.len() {
            return Err(AnalysisError::InsufficientData(format!(
                "regressor has {} values but response has {}",
                n,
                y.len()
            )));
        }
        if n < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "regression needs at least 2 observations, got {n}"
            )));
        }

        if x.iter().all(|xi| *xi == x[0]) {
            return Err(AnalysisError::InsufficientData(
                "regressor is constant, slope is undefined".to_string(),
            ));
        }

        let nf = n as f64;
        let mean_x = x.iter().sum::<f64>() / nf;
        let mean_y = y.iter().sum::<f64>() / nf;

        let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
        let sxy: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
            .sum();

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let fitted_values: Vec<f64> = x.iter().map(|xi| intercept + slope * xi).collect();
        let residuals: Vec<f64> = y
            .iter()
            .zip(&fitted_values)
            .map(|(yi, fi)| yi - fi)
            .collect();

        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            f64::NAN
        };

        let mut model = FittedModel {
            intercept,
            slope,
            intercept_std_err: None,
            slope_std_err: None,
            intercept_p_value: None,
            slope_p_value: None,
            r_squared,
            n_obs: n,
            fitted_values,
            residuals,
        };

        if n > 2 {
            let dof = nf - 2.0;
            let sigma2 = ss_res / dof;
            let se_slope = (sigma2 / sxx).sqrt();
            let se_intercept = (sigma2 * (1.0 / nf + mean_x * mean_x / sxx)).sqrt();

            model.slope_std_err = Some(se_slope);
            model.intercept_std_err = Some(se_intercept);
            model.slope_p_value = coefficient_p(slope, se_slope, dof);
            model.intercept_p_value = coefficient_p(intercept, se_intercept, dof);
        }

        Ok(model)
    }

    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Largest absolute residual.
    pub fn max_abs_residual(&self) -> f64 {
        self.residuals.iter().fold(0.0, |acc, r| acc.max(r.abs()))
    }
}

/// Two-sided p-value of a t statistic under Student's t with `dof` degrees of freedom.
pub(crate) fn two_sided_t_p(t: f64, dof: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, dof)
        .map_err(|e| AnalysisError::InsufficientData(format!("t distribution: {e}")))?;
    Ok(2.0 * (1.0 - dist.cdf(t.abs())))
}

/// A zero standard error with a non-zero estimate is an exact fit: p = 0.
fn coefficient_p(estimate: f64, std_err: f64, dof: f64) -> Option<f64> {
    if std_err == 0.0 {
        return if estimate == 0.0 { None } else { Some(0.0) };
    }
    two_sided_t_p(estimate / std_err, dof).ok()
}

impl fmt::Display for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(v: Option<f64>) -> String {
            v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string())
        }

        writeln!(f, "OLS fit, n = {}, R² = {:.4}", self.n_obs, self.r_squared)?;
        writeln!(f, "{:<10} {:>12} {:>10} {:>10}", "", "coef", "std err", "P>|t|")?;
        writeln!(
            f,
            "{:<10} {:>12.4} {:>10} {:>10}",
            "const",
            self.intercept,
            opt(self.intercept_std_err),
            opt(self.intercept_p_value)
        )?;
        write!(
            f,
            "{:<10} {:>12.4} {:>10} {:>10}",
            "x",
            self.slope,
            opt(self.slope_std_err),
            opt(self.slope_p_value)
        )
    }
}
