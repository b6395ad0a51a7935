use crate::config::Config;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "config.yaml";

pub const DATASET_EXTENSION: &str = "csv";

pub const FINAL_DATA_FILE: &str = "finaldata.csv";
pub const MANIFEST_FILE: &str = "ingestedfiles.txt";
pub const TEST_DATA_FILE: &str = "testdata.csv";
pub const MODEL_FILE: &str = "trainedmodel.json";
pub const SCORE_FILE: &str = "latestscore.txt";
pub const CONFUSION_MATRIX_FILE: &str = "confusionmatrix.json";
pub const API_RETURNS_FILE: &str = "apireturns.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Consolidated dataset written by the ingestor.
pub fn final_data_path(cfg: &Config) -> PathBuf {
    cfg.output_dir().join(FINAL_DATA_FILE)
}

/// Manifest written by the ingestor (staging copy).
pub fn manifest_path(cfg: &Config) -> PathBuf {
    cfg.output_dir().join(MANIFEST_FILE)
}

pub fn test_data_path(cfg: &Config) -> PathBuf {
    cfg.test_data_dir().join(TEST_DATA_FILE)
}

pub fn staging_model_path(cfg: &Config) -> PathBuf {
    cfg.model_dir().join(MODEL_FILE)
}

pub fn staging_score_path(cfg: &Config) -> PathBuf {
    cfg.model_dir().join(SCORE_FILE)
}

pub fn production_model_path(cfg: &Config) -> PathBuf {
    cfg.production_dir().join(MODEL_FILE)
}

pub fn production_score_path(cfg: &Config) -> PathBuf {
    cfg.production_dir().join(SCORE_FILE)
}

pub fn production_manifest_path(cfg: &Config) -> PathBuf {
    cfg.production_dir().join(MANIFEST_FILE)
}

pub fn confusion_matrix_path(cfg: &Config) -> PathBuf {
    cfg.model_dir().join(CONFUSION_MATRIX_FILE)
}

pub fn api_returns_path(cfg: &Config) -> PathBuf {
    cfg.model_dir().join(API_RETURNS_FILE)
}
