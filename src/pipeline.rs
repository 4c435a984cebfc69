//! Analysis Pipeline
//! Load -> transform -> filter -> analyze -> plot, in a fixed linear order.

use crate::charts::{ChartPlotter, HighlightStyles};
use crate::config::AnalysisConfig;
use crate::data::{DataLoader, DataProcessor, MergedRecord};
use crate::error::Result;
use crate::stats::{FittedModel, StatsCalculator};
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Rows of the merged table echoed to the log
const PREVIEW_ROWS: usize = 5;

/// Everything the run computed, written as `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub target_year: i32,
    pub life_records: usize,
    pub gdp_records: usize,
    pub merged_records: usize,
    pub filtered_records: usize,
    pub pearson_r: f64,
    pub pearson_p: f64,
    pub pearson_significant: bool,
    pub log_gdp_model: FittedModel,
    pub trend_country: String,
    pub trend_start: i32,
    pub trend_end: i32,
    pub trend_years: usize,
    pub trend_model: FittedModel,
    pub paired_t: f64,
    pub paired_p: f64,
}

/// Runs the fixed analysis for one configuration.
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load both tables, melt them and inner-join the result.
    ///
    /// Returns `(life record count, gdp record count, merged records)`.
    pub fn load_and_merge(&self) -> Result<(usize, usize, Vec<MergedRecord>)> {
        let loader = DataLoader::new(&self.config.life_path, &self.config.gdp_path);
        let life_raw = loader.load_life_expectancy()?;
        let gdp_raw = loader.load_gdp_per_capita()?;

        let life_long = DataProcessor::melt_life_expectancy(&life_raw)?;
        let gdp_long = DataProcessor::melt_gdp_per_capita(&gdp_raw)?;
        let merged = DataProcessor::merge_datasets(&life_long, &gdp_long);

        info!(
            "Merged {} records ({} life, {} GDP)",
            merged.len(),
            life_long.len(),
            gdp_long.len()
        );
        for r in merged.iter().take(PREVIEW_ROWS) {
            info!(
                "  {:<24} {} life={:.2} gdp={:.0}",
                r.country, r.year, r.life_expectancy, r.gdp_per_capita
            );
        }

        Ok((life_long.len(), gdp_long.len(), merged))
    }

    /// Run every stage. Charts written before a failure stay on disk.
    pub fn run(&self) -> Result<AnalysisSummary> {
        let cfg = &self.config;
        fs::create_dir_all(&cfg.results_dir)?;

        let (life_records, gdp_records, merged) = self.load_and_merge()?;

        let slice = StatsCalculator::filter_year(&merged, cfg.target_year, &cfg.bounds);
        info!(
            "Year {}: {} records after outlier filtering",
            cfg.target_year,
            slice.len()
        );

        let (pearson_r, pearson_p) = StatsCalculator::pearson_correlation(&slice)?;
        info!(
            "Pearson correlation (year {}, filtered): r = {:.3}, p-value = {:.4}",
            cfg.target_year, pearson_r, pearson_p
        );

        let log_gdp_model = StatsCalculator::regression_log_gdp(&slice)?;
        info!("Life expectancy ~ log10(GDP per capita):\n{log_gdp_model}");

        let highlights = HighlightStyles::from_rgb_map(&cfg.highlights);
        ChartPlotter::plot_scatter_log(&slice, &highlights, cfg.target_year, &cfg.scatter_path())?;
        ChartPlotter::plot_regression_log(
            &slice,
            &log_gdp_model,
            &highlights,
            cfg.target_year,
            &cfg.regression_path(),
        )?;

        let trend = StatsCalculator::trend_for_country(
            &merged,
            &cfg.trend_country,
            cfg.trend_start,
            cfg.trend_end,
        )?;
        info!(
            "{} trend regression ({}-{}):\n{}",
            cfg.trend_country, cfg.trend_start, cfg.trend_end, trend.model
        );
        ChartPlotter::plot_country_trend(
            &trend,
            &cfg.trend_country,
            cfg.trend_start,
            cfg.trend_end,
            &cfg.trend_path(),
        )?;

        let (paired_t, paired_p) = StatsCalculator::paired_year_over_year_test(&trend.records)?;
        info!(
            "Paired t-test on {} year-over-year differences: t = {:.3}, p-value = {:.4}",
            cfg.trend_country, paired_t, paired_p
        );

        let summary = AnalysisSummary {
            target_year: cfg.target_year,
            life_records,
            gdp_records,
            merged_records: merged.len(),
            filtered_records: slice.len(),
            pearson_r,
            pearson_p,
            pearson_significant: StatsCalculator::is_significant(pearson_p),
            log_gdp_model,
            trend_country: cfg.trend_country.clone(),
            trend_start: cfg.trend_start,
            trend_end: cfg.trend_end,
            trend_years: trend.records.len(),
            trend_model: trend.model,
            paired_t,
            paired_p,
        };
        write_summary(&summary, &cfg.summary_path())?;

        Ok(summary)
    }
}

/// Write the summary as pretty JSON. Non-finite numbers become `null`.
pub fn write_summary(summary: &AnalysisSummary, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary).map_err(std::io::Error::from)?;
    writer.flush()?;
    info!("Wrote summary to {}", path.display());
    Ok(())
}
