//! LifeGDP - runs the fixed life expectancy vs. GDP analysis.

use anyhow::Context;
use lifegdp::{AnalysisConfig, Pipeline};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::from_env().context("failed to load configuration")?;
    info!(
        "Analyzing {} and {} into {}",
        config.life_path.display(),
        config.gdp_path.display(),
        config.results_dir.display()
    );

    let summary = Pipeline::new(config)
        .run()
        .context("analysis pipeline failed")?;

    info!(
        "Done: {} merged records, {} in the {} slice",
        summary.merged_records, summary.filtered_records, summary.target_year
    );
    Ok(())
}
