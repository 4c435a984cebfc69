use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use lifegdp::data::{load_raw_table, DataLoader, DataProcessor};
use lifegdp::stats::StatsCalculator;
use lifegdp::pipeline::write_summary;
use lifegdp::{AnalysisConfig, AnalysisError, FilterBounds, Pipeline};

const LIFE_CSV: &str = "\
country,2000,2001,2002,2020
Czechia,75.0,75.5,76.0,79.0
Chad,47.9,48.3,,52.8
Peru,70.4,70.9,71.3,76.7
\"Korea, Rep.\",76.0,76.5,77.1,83.4
Norway,78.7,78.9,79.1,83.2
";

const GDP_CSV: &str = "\
country,2000,2001,2002,2020
Czechia,15000,15750,16500,38.3k
Chad,900,950,1k,1.5k
Peru,6000,6.1k,6.2k,11.9k
\"Korea, Rep.\",\"20,100\",21k,22.3k,43k
Atlantis,1k,1k,1k,1k
Norway,55k,56k,57k,abc
";

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let life = dir.join("lex.csv");
    let gdp = dir.join("gdp_pcap.csv");
    fs::write(&life, LIFE_CSV).unwrap();
    fs::write(&gdp, GDP_CSV).unwrap();
    (life, gdp)
}

#[test]
fn melt_counts_present_cells() {
    let dir = tempfile::tempdir().unwrap();
    let (life, gdp) = write_inputs(dir.path());

    let life_long = DataProcessor::melt_life_expectancy(&load_raw_table(&life).unwrap()).unwrap();
    let gdp_long = DataProcessor::melt_gdp_per_capita(&load_raw_table(&gdp).unwrap()).unwrap();

    // 5 countries x 4 years minus Chad 2002
    assert_eq!(life_long.len(), 19);
    // 6 countries x 4 years minus Norway 2020
    assert_eq!(gdp_long.len(), 23);

    let korea = gdp_long
        .iter()
        .find(|r| r.country == "Korea, Rep." && r.year == 2000)
        .unwrap();
    assert_eq!(korea.value, 20100.0);
}

#[test]
fn merged_keys_are_the_intersection() {
    let dir = tempfile::tempdir().unwrap();
    let (life, gdp) = write_inputs(dir.path());
    let loader = DataLoader::new(&life, &gdp);

    let life_long =
        DataProcessor::melt_life_expectancy(&loader.load_life_expectancy().unwrap()).unwrap();
    let gdp_long =
        DataProcessor::melt_gdp_per_capita(&loader.load_gdp_per_capita().unwrap()).unwrap();
    let merged = DataProcessor::merge_datasets(&life_long, &gdp_long);

    let life_keys: HashSet<(String, i32)> =
        life_long.iter().map(|r| (r.country.clone(), r.year)).collect();
    let gdp_keys: HashSet<(String, i32)> =
        gdp_long.iter().map(|r| (r.country.clone(), r.year)).collect();
    let merged_keys: HashSet<(String, i32)> =
        merged.iter().map(|r| (r.country.clone(), r.year)).collect();

    assert_eq!(merged.len(), merged_keys.len());
    assert_eq!(
        merged_keys,
        life_keys.intersection(&gdp_keys).cloned().collect::<HashSet<_>>()
    );
    assert!(!merged_keys.contains(&("Atlantis".to_string(), 2000)));
    assert!(!merged_keys.contains(&("Norway".to_string(), 2020)));
}

#[test]
fn czechia_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let life = dir.path().join("lex.csv");
    let gdp = dir.path().join("gdp.csv");
    fs::write(&life, "country,2000,2001,2002\nCzechia,75.0,75.5,76.0\n").unwrap();
    fs::write(&gdp, "country,2000,2001,2002\nCzechia,15000,15750,16500\n").unwrap();

    let config = AnalysisConfig {
        life_path: life,
        gdp_path: gdp,
        ..AnalysisConfig::default()
    };
    let (_, _, merged) = Pipeline::new(config).load_and_merge().unwrap();
    assert_eq!(merged.len(), 3);

    let trend = StatsCalculator::trend_for_country(&merged, "Czechia", 2000, 2002).unwrap();
    assert!((trend.model.slope - 0.5).abs() < 1e-9);
    assert!(trend.model.max_abs_residual() < 1e-6);

    let (t, p) = StatsCalculator::paired_year_over_year_test(&trend.records).unwrap();
    assert_eq!(t, f64::INFINITY);
    assert_eq!(p, 0.0);
}

#[test]
fn year_slice_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let (life, gdp) = write_inputs(dir.path());
    let config = AnalysisConfig {
        life_path: life,
        gdp_path: gdp,
        ..AnalysisConfig::default()
    };
    let (_, _, merged) = Pipeline::new(config).load_and_merge().unwrap();

    let slice = StatsCalculator::filter_year(&merged, 2020, &FilterBounds::default());
    let countries: HashSet<&str> = slice.iter().map(|r| r.country.as_str()).collect();
    assert_eq!(
        countries,
        HashSet::from(["Czechia", "Chad", "Peru", "Korea, Rep."])
    );

    let (r, _) = StatsCalculator::pearson_correlation(&slice).unwrap();
    assert!(r > 0.5);

    let model = StatsCalculator::regression_log_gdp(&slice).unwrap();
    assert!(model.slope > 0.0);
    assert_eq!(model.n_obs, 4);
}

#[test]
fn run_writes_charts_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let (life, gdp) = write_inputs(dir.path());
    let config = AnalysisConfig {
        life_path: life,
        gdp_path: gdp,
        results_dir: dir.path().join("results"),
        trend_country: "Czechia".to_string(),
        ..AnalysisConfig::default()
    };

    let summary = Pipeline::new(config.clone()).run().unwrap();
    for path in [
        config.scatter_path(),
        config.regression_path(),
        config.trend_path(),
        config.summary_path(),
    ] {
        assert!(path.is_file(), "{} was not written", path.display());
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    assert_eq!(summary.filtered_records, 4);
    assert_eq!(summary.trend_years, 4);
    assert!(summary.paired_t.is_finite());
    assert!(summary.pearson_r > 0.5);
}

#[test]
fn written_summary_is_complete_json() {
    let dir = tempfile::tempdir().unwrap();
    let (life, gdp) = write_inputs(dir.path());
    let config = AnalysisConfig {
        life_path: life,
        gdp_path: gdp,
        results_dir: dir.path().join("results"),
        trend_country: "Czechia".to_string(),
        ..AnalysisConfig::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    let path = dir.path().join("copy.json");
    write_summary(&summary, &path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["target_year"], 2020);
    assert_eq!(json["trend_country"], "Czechia");
    assert_eq!(json["merged_records"], summary.merged_records);
    assert!(json["log_gdp_model"]["slope"].is_f64());
}

#[test]
fn write_summary_fails_for_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let (life, gdp) = write_inputs(dir.path());
    let config = AnalysisConfig {
        life_path: life,
        gdp_path: gdp,
        results_dir: dir.path().join("results"),
        trend_country: "Czechia".to_string(),
        ..AnalysisConfig::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    let err = write_summary(&summary, &dir.path().join("no_such_dir").join("s.json")).unwrap_err();
    assert!(matches!(err, AnalysisError::Io(_)));
}

#[test]
fn run_fails_on_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        life_path: dir.path().join("missing.csv"),
        gdp_path: dir.path().join("gdp.csv"),
        results_dir: dir.path().join("results"),
        ..AnalysisConfig::default()
    };

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound(_)));
    assert!(dir.path().join("results").is_dir());
}

#[test]
fn run_fails_when_year_slice_is_too_small() {
    let dir = tempfile::tempdir().unwrap();
    let (life, gdp) = write_inputs(dir.path());
    let config = AnalysisConfig {
        life_path: life,
        gdp_path: gdp,
        results_dir: dir.path().join("results"),
        target_year: 1990,
        ..AnalysisConfig::default()
    };

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData(_)));
}

#[test]
fn non_integer_year_column_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let life = dir.path().join("lex.csv");
    fs::write(&life, "country,2000,total\nChad,47.9,47.9\n").unwrap();

    let err = DataProcessor::melt_life_expectancy(&load_raw_table(&life).unwrap()).unwrap_err();
    assert!(matches!(err, AnalysisError::ParseError(_)));
}
