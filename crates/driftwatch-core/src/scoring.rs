use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::model::LogisticModel;
use crate::paths;
use std::path::Path;
use tracing::info;

const SCORE_LABEL: &str = "F1 Score";

/// Binary F1 for the positive class `1`: `2tp / (2tp + fp + fn)`, or `0.0`
/// when there are no positive labels and no positive predictions.
pub fn f1_score(y_true: &[u8], y_pred: &[u8]) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::DataSchema(format!(
            "{} predictions for {} labelled rows",
            y_pred.len(),
            y_true.len()
        )));
    }
    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t == 1, p == 1) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        return Ok(0.0);
    }
    Ok((2 * tp) as f64 / denom as f64)
}

// ---------------------------------------------------------------------------
// ScoreRecord
// ---------------------------------------------------------------------------

/// Persisted score, one line of the form `F1 Score: <float>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRecord {
    pub f1: f64,
}

impl ScoreRecord {
    pub fn new(f1: f64) -> Self {
        Self { f1 }
    }

    pub fn render(&self) -> String {
        format!("{SCORE_LABEL}: {}", self.f1)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let line = text.lines().next().unwrap_or("").trim();
        let value = line
            .strip_prefix(SCORE_LABEL)
            .and_then(|rest| rest.trim_start().strip_prefix(':'))
            .ok_or_else(|| {
                PipelineError::DataSchema(format!("malformed score record: '{line}'"))
            })?;
        let f1 = value.trim().parse::<f64>().map_err(|_| {
            PipelineError::DataSchema(format!("malformed score value: '{}'", value.trim()))
        })?;
        if !f1.is_finite() || !(0.0..=1.0).contains(&f1) {
            return Err(PipelineError::DataSchema(format!(
                "score value out of range [0, 1]: {f1}"
            )));
        }
        Ok(Self { f1 })
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&crate::io::read_artifact(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::atomic_write(path, self.render().as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Default mode: load `model_path`, predict `dataset_path`, persist the F1
/// to `score_path`, return it.
pub fn score_model(model_path: &Path, dataset_path: &Path, score_path: &Path) -> Result<f64> {
    let model = LogisticModel::load(model_path)?;
    let dataset = Dataset::read(dataset_path)?;
    let labels = dataset.labels()?;
    let predictions = model.predict_dataset(&dataset)?;
    let f1 = f1_score(&labels, &predictions)?;
    ScoreRecord::new(f1).save(score_path)?;
    info!(
        f1,
        model = %model_path.display(),
        dataset = %dataset_path.display(),
        "model scored"
    );
    Ok(f1)
}

/// Supplied-predictions mode: F1 of `predictions` against the labels of
/// `dataset_path`. Reads no model and writes nothing.
pub fn score_predictions(predictions: &[u8], dataset_path: &Path) -> Result<f64> {
    let dataset = Dataset::read(dataset_path)?;
    f1_score(&dataset.labels()?, predictions)
}

/// Score the staging model against the test dataset and record it in staging.
pub fn score_staging(cfg: &Config) -> Result<f64> {
    score_model(
        &paths::staging_model_path(cfg),
        &paths::test_data_path(cfg),
        &paths::staging_score_path(cfg),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::write_csv;
    use crate::model::tests::fixed_model;
    use tempfile::TempDir;

    #[test]
    fn f1_matches_hand_computation() {
        // tp=2 fp=1 fn=1 -> 4 / 6
        let f1 = f1_score(&[1, 1, 1, 0, 0], &[1, 1, 0, 1, 0]).unwrap();
        assert!((f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn f1_without_positives_is_zero() {
        assert_eq!(f1_score(&[0, 0], &[0, 0]).unwrap(), 0.0);
    }

    #[test]
    fn f1_rejects_length_mismatch() {
        assert!(matches!(
            f1_score(&[1, 0], &[1]),
            Err(PipelineError::DataSchema(_))
        ));
    }

    #[test]
    fn score_record_text_format() {
        let rec = ScoreRecord::new(0.75);
        assert_eq!(rec.render(), "F1 Score: 0.75");
        assert_eq!(ScoreRecord::parse("F1 Score: 0.90\n").unwrap().f1, 0.9);
        assert!(ScoreRecord::parse("score=0.9").is_err());
        assert!(ScoreRecord::parse("F1 Score: high").is_err());
    }

    #[test]
    fn score_record_rejects_non_finite_and_out_of_range() {
        for text in ["F1 Score: NaN", "F1 Score: inf", "F1 Score: -0.1", "F1 Score: 1.5"] {
            assert!(
                matches!(ScoreRecord::parse(text), Err(PipelineError::DataSchema(_))),
                "accepted {text}"
            );
        }
        assert_eq!(ScoreRecord::parse("F1 Score: 1.0").unwrap().f1, 1.0);
        assert_eq!(ScoreRecord::parse("F1 Score: 0").unwrap().f1, 0.0);
    }

    #[test]
    fn score_record_keeps_full_precision() {
        let f1 = 4.0 / 7.0;
        let rec = ScoreRecord::parse(&ScoreRecord::new(f1).render()).unwrap();
        assert_eq!(rec.f1, f1);
    }

    #[test]
    fn both_modes_agree() {
        let dir = TempDir::new().unwrap();
        let data = write_csv(
            dir.path(),
            "testdata.csv",
            &["a,1,0,0,0", "b,6,0,0,1", "c,7,0,0,0", "d,2,0,0,1", "e,9,0,0,1"],
        );
        let model_path = dir.path().join("trainedmodel.json");
        let model = fixed_model([1.0, 0.0, 0.0], -5.0);
        model.save(&model_path).unwrap();
        let score_path = dir.path().join("latestscore.txt");

        let default_mode = score_model(&model_path, &data, &score_path).unwrap();
        let ds = Dataset::read(&data).unwrap();
        let predictions = model.predict_dataset(&ds).unwrap();
        let supplied = score_predictions(&predictions, &data).unwrap();

        assert_eq!(default_mode, supplied);
        assert_eq!(ScoreRecord::load(&score_path).unwrap().f1, default_mode);
    }

    #[test]
    fn supplied_mode_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let data = write_csv(dir.path(), "testdata.csv", &["a,1,0,0,1"]);
        let before: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        let f1 = score_predictions(&[1], &data).unwrap();
        let after: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(f1, 1.0);
        assert_eq!(before.len(), after.len());
    }

    #[test]
    fn missing_model_is_artifact_not_found() {
        let dir = TempDir::new().unwrap();
        let data = write_csv(dir.path(), "testdata.csv", &["a,1,0,0,1"]);
        let err = score_model(
            &dir.path().join("trainedmodel.json"),
            &data,
            &dir.path().join("latestscore.txt"),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactNotFound(_)));
    }

    #[test]
    fn missing_label_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("testdata.csv");
        std::fs::write(&data, "lastmonth_activity,lastyear_activity,number_of_employees\n1,2,3\n")
            .unwrap();
        assert!(matches!(
            score_predictions(&[1], &data),
            Err(PipelineError::DataSchema(_))
        ));
    }
}
