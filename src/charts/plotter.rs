//! Chart Plotter Module
//! Renders the scatter, regression and trend charts to PNG using plotters.

use crate::charts::style::{HighlightStyles, DEFAULT_POINT_COLOR};
use crate::data::MergedRecord;
use crate::error::{AnalysisError, Result};
use crate::stats::{FittedModel, Trend};
use log::info;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

/// Output size in pixels
pub const CHART_SIZE: (u32, u32) = (1200, 900);

/// Points on the fitted curve of the regression chart
pub const CURVE_POINTS: usize = 200;

const FIT_COLOR: RGBColor = RGBColor(220, 20, 60); // Red
const TREND_POINT_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue
const TREND_LINE_COLOR: RGBColor = RGBColor(46, 139, 87); // Green

fn render_err<E: Display>(err: E) -> AnalysisError {
    AnalysisError::Render(err.to_string())
}

/// Creates the static chart images of the analysis.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Scatter of life expectancy against GDP per capita on a log10 x axis.
    pub fn plot_scatter_log(
        slice: &[MergedRecord],
        highlights: &HighlightStyles,
        year: i32,
        path: &Path,
    ) -> Result<()> {
        let title = format!("GDP per Capita vs. Life Expectancy ({year})");
        Self::draw_log_scatter(slice, None, highlights, year, &title, path)
    }

    /// Scatter plus the fitted `life ~ log10(gdp)` curve.
    pub fn plot_regression_log(
        slice: &[MergedRecord],
        model: &FittedModel,
        highlights: &HighlightStyles,
        year: i32,
        path: &Path,
    ) -> Result<()> {
        let title = format!("Regression: Life Expectancy vs. log10(GDP) ({year})");
        Self::draw_log_scatter(slice, Some(model), highlights, year, &title, path)
    }

    /// Yearly life expectancy of one country with its trend line over the window.
    pub fn plot_country_trend(
        trend: &Trend,
        country: &str,
        year_lo: i32,
        year_hi: i32,
        path: &Path,
    ) -> Result<()> {
        if trend.records.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no records to plot for '{country}'"
            )));
        }

        let line = [
            (f64::from(year_lo), trend.model.predict(f64::from(year_lo))),
            (f64::from(year_hi), trend.model.predict(f64::from(year_hi))),
        ];
        let (y_lo, y_hi) = Self::padded_range(
            trend
                .records
                .iter()
                .map(|r| r.life_expectancy)
                .chain(line.iter().map(|&(_, y)| y)),
        );
        let x_lo = f64::from(year_lo) - 0.5;
        let x_hi = f64::from(year_hi) + 0.5;

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Life Expectancy Trend ({year_lo}-{year_hi}) for {country}"),
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(format!("Life Expectancy ({country})"))
            .x_label_formatter(&|x| format!("{x:.0}"))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(trend.records.iter().map(|r| {
                Circle::new(
                    (f64::from(r.year), r.life_expectancy),
                    5,
                    TREND_POINT_COLOR.filled(),
                )
            }))
            .map_err(render_err)?
            .label(country.to_string())
            .legend(|(x, y)| Circle::new((x, y), 5, TREND_POINT_COLOR.filled()));

        chart
            .draw_series(LineSeries::new(line, TREND_LINE_COLOR.stroke_width(3)))
            .map_err(render_err)?
            .label("Trend line")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TREND_LINE_COLOR.stroke_width(3)));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!("Wrote trend chart to {}", path.display());
        Ok(())
    }

    fn draw_log_scatter(
        slice: &[MergedRecord],
        model: Option<&FittedModel>,
        highlights: &HighlightStyles,
        year: i32,
        title: &str,
        path: &Path,
    ) -> Result<()> {
        let (x_lo, x_hi) = Self::log_range(slice.iter().map(|r| r.gdp_per_capita))
            .ok_or_else(|| {
                AnalysisError::InsufficientData("no positive GDP values to plot".to_string())
            })?;
        let curve = model
            .map(|m| Self::fit_curve(m, x_lo, x_hi, CURVE_POINTS))
            .unwrap_or_default();
        let (y_lo, y_hi) = Self::padded_range(
            slice
                .iter()
                .map(|r| r.life_expectancy)
                .chain(curve.iter().map(|&(_, y)| y)),
        );
        let (x_min, x_max) = (x_lo / 1.25, x_hi * 1.25);

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d((x_min..x_max).log_scale(), y_lo..y_hi)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc(format!("GDP per Capita (USD, {year}) [log10 scale]"))
            .y_desc(format!("Life Expectancy (years, {year})"))
            .x_label_formatter(&|x| format!("{x:.0}"))
            .draw()
            .map_err(render_err)?;

        let (others, groups) = highlights.partition(slice);

        chart
            .draw_series(others.iter().map(|r| {
                Circle::new(
                    (r.gdp_per_capita, r.life_expectancy),
                    4,
                    DEFAULT_POINT_COLOR.mix(0.7).filled(),
                )
            }))
            .map_err(render_err)?
            .label(format!("Countries ({year})"))
            .legend(|(x, y)| Circle::new((x, y), 4, DEFAULT_POINT_COLOR.filled()));

        for group in &groups {
            let color = group.color;
            chart
                .draw_series(group.records.iter().map(|r| {
                    Circle::new((r.gdp_per_capita, r.life_expectancy), 8, color.filled())
                }))
                .map_err(render_err)?
                .label(group.country)
                .legend(move |(x, y)| Circle::new((x, y), 6, color.filled()));
        }

        if !curve.is_empty() {
            chart
                .draw_series(LineSeries::new(curve, FIT_COLOR.stroke_width(3)))
                .map_err(render_err)?
                .label("Fit: LifeExp ~ log10(GDP)")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FIT_COLOR.stroke_width(3)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!("Wrote chart to {}", path.display());
        Ok(())
    }

    /// Min and max of the positive values, `None` if there are none.
    pub fn log_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        values
            .filter(|v| *v > 0.0 && v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Value range padded by 10% on each side (1 unit when flat).
    pub fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
        let (min, max) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return (0.0, 100.0);
        }
        let pad = if max > min { (max - min) * 0.1 } else { 1.0 };
        (min - pad, max + pad)
    }

    /// `n` points evenly spaced in log10 between `lo` and `hi` inclusive.
    pub fn logspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
        let (a, b) = (lo.log10(), hi.log10());
        match n {
            0 => Vec::new(),
            1 => vec![lo],
            _ => (0..n)
                .map(|i| 10f64.powf(a + (b - a) * i as f64 / (n - 1) as f64))
                .collect(),
        }
    }

    /// The model's prediction at log-spaced GDP values, as (gdp, life) points.
    pub fn fit_curve(model: &FittedModel, lo: f64, hi: f64, n: usize) -> Vec<(f64, f64)> {
        Self::logspace(lo, hi, n)
            .into_iter()
            .map(|gdp| (gdp, model.predict(gdp.log10())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_range_ignores_non_positive() {
        let range = ChartPlotter::log_range([0.0, 500.0, -3.0, 12000.0].into_iter());
        assert_eq!(range, Some((500.0, 12000.0)));
        assert_eq!(ChartPlotter::log_range([0.0, -1.0].into_iter()), None);
    }

    #[test]
    fn padded_range_handles_flat_and_empty() {
        assert_eq!(ChartPlotter::padded_range([70.0, 70.0].into_iter()), (69.0, 71.0));
        assert_eq!(ChartPlotter::padded_range(std::iter::empty::<f64>()), (0.0, 100.0));
        let (lo, hi) = ChartPlotter::padded_range([50.0, 80.0].into_iter());
        assert!((lo - 47.0).abs() < 1e-9 && (hi - 83.0).abs() < 1e-9);
    }

    #[test]
    fn logspace_spans_endpoints() {
        let points = ChartPlotter::logspace(100.0, 100_000.0, 4);
        assert_eq!(points.len(), 4);
        for (got, want) in points.iter().zip([100.0, 1000.0, 10_000.0, 100_000.0]) {
            assert!((got - want).abs() / want < 1e-9);
        }
    }

    #[test]
    fn fit_curve_follows_model() {
        let model = FittedModel::fit(&[2.0, 3.0, 4.0], &[50.0, 60.0, 70.0]).unwrap();
        let curve = ChartPlotter::fit_curve(&model, 100.0, 10_000.0, CURVE_POINTS);
        assert_eq!(curve.len(), CURVE_POINTS);
        let (gdp, life) = curve[CURVE_POINTS - 1];
        assert!((gdp - 10_000.0).abs() < 1e-6);
        assert!((life - 70.0).abs() < 1e-6);
    }

    #[test]
    fn scatter_without_data_is_insufficient() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChartPlotter::plot_scatter_log(
            &[],
            &HighlightStyles::new(),
            2020,
            &dir.path().join("scatter.png"),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }
}
