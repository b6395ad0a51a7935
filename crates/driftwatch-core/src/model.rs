use crate::config::TrainingConfig;
use crate::dataset::{Dataset, FEATURE_COLUMNS};
use crate::error::{PipelineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fitted binary logistic classifier, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub features: Vec<String>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub hyperparameters: TrainingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holdout_f1: Option<f64>,
    /// Newton iterations until convergence.
    #[serde(default)]
    pub iterations: u32,
    pub trained_at: DateTime<Utc>,
}

impl LogisticModel {
    pub fn load(path: &Path) -> Result<Self> {
        let data = crate::io::read_artifact(path)?;
        let model: LogisticModel = serde_json::from_str(&data)?;
        if model.weights.len() != model.features.len() {
            return Err(PipelineError::DataSchema(format!(
                "model at {} has {} weights for {} features",
                path.display(),
                model.weights.len(),
                model.features.len()
            )));
        }
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    pub fn decision(&self, x: &[f64; 3]) -> f64 {
        self.weights
            .iter()
            .zip(x.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept
    }

    pub fn probability(&self, x: &[f64; 3]) -> f64 {
        sigmoid(self.decision(x))
    }

    /// Class 1 when the decision function is strictly positive.
    pub fn predict_row(&self, x: &[f64; 3]) -> u8 {
        u8::from(self.decision(x) > 0.0)
    }

    pub fn predict(&self, rows: &[[f64; 3]]) -> Vec<u8> {
        rows.iter().map(|x| self.predict_row(x)).collect()
    }

    pub fn predict_dataset(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        if self.features.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
            return Err(PipelineError::DataSchema(format!(
                "model expects features [{}]",
                self.features.join(", ")
            )));
        }
        Ok(self.predict(&dataset.features()?))
    }
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
