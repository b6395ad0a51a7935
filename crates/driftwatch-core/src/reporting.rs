use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::model::LogisticModel;
use crate::paths;
use crate::scoring::f1_score;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// 2x2 confusion matrix, rows = actual label, columns = predicted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[u8], predicted: &[u8]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(PipelineError::DataSchema(format!(
                "{} predictions for {} labelled rows",
                predicted.len(),
                actual.len()
            )));
        }
        let mut cm = ConfusionMatrix {
            true_negative: 0,
            false_positive: 0,
            false_negative: 0,
            true_positive: 0,
        };
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a == 1, p == 1) {
                (false, false) => cm.true_negative += 1,
                (false, true) => cm.false_positive += 1,
                (true, false) => cm.false_negative += 1,
                (true, true) => cm.true_positive += 1,
            }
        }
        Ok(cm)
    }

    pub fn rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub dataset: PathBuf,
    pub confusion_matrix: ConfusionMatrix,
    pub f1: f64,
    pub path: PathBuf,
}

/// Confusion matrix of the production model on the test dataset, written to
/// the model output folder.
pub fn report(cfg: &Config) -> Result<Report> {
    let model = LogisticModel::load(&paths::production_model_path(cfg))?;
    let dataset_path = paths::test_data_path(cfg);
    let dataset = Dataset::read(&dataset_path)?;
    let actual = dataset.labels()?;
    let predicted = model.predict_dataset(&dataset)?;

    let cm = ConfusionMatrix::from_predictions(&actual, &predicted)?;
    let f1 = f1_score(&actual, &predicted)?;

    let path = paths::confusion_matrix_path(cfg);
    let body = serde_json::json!({
        "labels": [0, 1],
        "matrix": cm.rows(),
        "confusion_matrix": cm,
        "f1": f1,
    });
    crate::io::atomic_write(&path, serde_json::to_string_pretty(&body)?.as_bytes())?;
    info!(path = %path.display(), rows = cm.total(), "confusion matrix written");

    Ok(Report {
        dataset: dataset_path,
        confusion_matrix: cm,
        f1,
        path,
    })
}
