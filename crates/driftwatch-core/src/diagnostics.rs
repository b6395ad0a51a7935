use crate::config::Config;
use crate::dataset::{Dataset, FEATURE_COLUMNS};
use crate::error::Result;
use crate::model::LogisticModel;
use crate::paths;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

pub fn model_predictions(model: &LogisticModel, dataset_path: &Path) -> Result<Vec<u8>> {
    model.predict_dataset(&Dataset::read(dataset_path)?)
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
}

pub fn summarize_column(column: &str, values: &[f64]) -> ColumnSummary {
    let n = values.len();
    let mean = (n > 0).then(|| values.iter().sum::<f64>() / n as f64);
    let median = (n > 0).then(|| {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        }
    });
    let std = match mean {
        Some(m) if n > 1 => {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        }
        _ => None,
    };
    ColumnSummary {
        column: column.to_string(),
        mean,
        median,
        std,
    }
}

/// Mean, median and std of each feature column; missing cells are skipped.
pub fn dataframe_summary(dataset: &Dataset) -> Result<Vec<ColumnSummary>> {
    FEATURE_COLUMNS
        .iter()
        .map(|name| {
            let values: Vec<f64> = dataset.numeric_column(name)?.into_iter().flatten().collect();
            Ok(summarize_column(name, &values))
        })
        .collect()
}

pub fn summary_stats(cfg: &Config) -> Result<Vec<ColumnSummary>> {
    dataframe_summary(&Dataset::read(&paths::final_data_path(cfg))?)
}

// ---------------------------------------------------------------------------
// Missing data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingData {
    pub column: String,
    pub percent: f64,
}

pub fn missing_data(cfg: &Config) -> Result<Vec<MissingData>> {
    let dataset = Dataset::read(&paths::final_data_path(cfg))?;
    Ok(dataset
        .missing_percentages()
        .into_iter()
        .map(|(column, percent)| MissingData { column, percent })
        .collect())
}

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Timings {
    pub ingestion_secs: f64,
    pub training_secs: f64,
}

/// Time a full ingestion followed by a training run. Both write staging
/// artifacts only; production is untouched. The retrained staging model is
/// re-scored afterwards so the staging score always describes it.
pub fn execution_time(cfg: &Config) -> Result<Timings> {
    let start = Instant::now();
    crate::ingestion::ingest(cfg)?;
    let ingestion_secs = start.elapsed().as_secs_f64();

    let start = Instant::now();
    crate::training::train(cfg)?;
    let training_secs = start.elapsed().as_secs_f64();

    crate::scoring::score_staging(cfg)?;

    debug!(ingestion_secs, training_secs, "timed pipeline stages");
    Ok(Timings {
        ingestion_secs,
        training_secs,
    })
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutdatedPackage {
    pub name: String,
    /// `None` when the package is not installed at all.
    pub installed: Option<String>,
    pub required: String,
}

static PIN_RE: OnceLock<Regex> = OnceLock::new();

fn pin_re() -> &'static Regex {
    PIN_RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._\-]*)\s*==\s*([^\s;#]+)").unwrap()
    })
}

/// Parse `name==version` lines. Names are lowercased; other lines are skipped.
pub fn parse_pins(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let caps = pin_re().captures(line)?;
            Some((caps[1].to_lowercase(), caps[2].to_string()))
        })
        .collect()
}

/// Compare dotted versions component by component, numerically where both
/// components start with digits.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(x), None) => {
                return if is_zero(x) && left.clone().all(is_zero) {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            (None, Some(y)) => {
                return if is_zero(y) && right.clone().all(is_zero) {
                    Ordering::Equal
                } else {
                    Ordering::Less
                }
            }
            (Some(x), Some(y)) => {
                let ord = match (leading_number(x), leading_number(y)) {
                    (Some(nx), Some(ny)) => nx.cmp(&ny).then_with(|| x.cmp(y)),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn is_zero(part: &str) -> bool {
    part.trim_start_matches('0').is_empty()
}

fn leading_number(part: &str) -> Option<u64> {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Packages pinned in `requirements` whose installed version is older than
/// the pin, or which are not installed.
pub fn outdated_packages(requirements: &str, installed: &str) -> Vec<OutdatedPackage> {
    let installed = parse_pins(installed);
    parse_pins(requirements)
        .into_iter()
        .filter_map(|(name, required)| {
            let current = installed
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone());
            let lags = match &current {
                Some(v) => compare_versions(v, &required) == Ordering::Less,
                None => true,
            };
            lags.then_some(OutdatedPackage {
                name,
                installed: current,
                required,
            })
        })
        .collect()
}

pub fn outdated_packages_list(cfg: &Config) -> Result<Vec<OutdatedPackage>> {
    let requirements = crate::io::read_artifact(&cfg.requirements_file())?;
    let Some(inventory) = cfg.installed_packages_file() else {
        debug!("no installed_packages_path configured, skipping dependency check");
        return Ok(Vec::new());
    };
    let installed = crate::io::read_artifact(&inventory)?;
    Ok(outdated_packages(&requirements, &installed))
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub execution_time: Timings,
    pub missing_data: Vec<MissingData>,
    pub outdated_packages: Vec<OutdatedPackage>,
}

pub fn run(cfg: &Config) -> Result<DiagnosticsReport> {
    let execution_time = execution_time(cfg)?;
    Ok(DiagnosticsReport {
        execution_time,
        missing_data: missing_data(cfg)?,
        outdated_packages: outdated_packages_list(cfg)?,
    })
}
