//! Model-drift re-deployment control loop.
//!
//! Each gate can end the run early:
//!
//! ```text
//! CHECK_NEW_DATA ─(same files)──────────────▶ NoNewData
//!   │ new files: re-ingest everything
//! NEW_DATA_FOUND: production model predicts the consolidated dataset
//! SCORE_COMPUTED ─(fresh >= production)──────▶ NoDrift
//!   │ fresh < production
//! DRIFT_DETECTED: retrain, re-score staging
//! RETRAIN_DONE:   promote staging ───────────▶ Redeployed
//! ```

use crate::config::Config;
use crate::dataset::Dataset;
use crate::deployment;
use crate::error::Result;
use crate::handle::ModelHandle;
use crate::ingestion;
use crate::manifest::Manifest;
use crate::model::LogisticModel;
use crate::paths;
use crate::scoring::{self, ScoreRecord};
use crate::training;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CheckNewData,
    NewDataFound,
    ScoreComputed,
    DriftDetected,
    RetrainDone,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::CheckNewData => "check_new_data",
            Stage::NewDataFound => "new_data_found",
            Stage::ScoreComputed => "score_computed",
            Stage::DriftDetected => "drift_detected",
            Stage::RetrainDone => "retrain_done",
        }
    }
}

/// Where a run of the control loop ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Input files match the production manifest; nothing else ran.
    NoNewData,
    /// New data scored at least as well as the recorded production score.
    NoDrift { fresh: f64, production: f64 },
    /// Drift found; a retrained model was promoted with score `retrained`.
    Redeployed {
        fresh: f64,
        production: f64,
        retrained: f64,
    },
}

impl Outcome {
    pub fn redeployed(&self) -> bool {
        matches!(self, Outcome::Redeployed { .. })
    }
}

/// The collaborators the control loop drives.
pub trait Stages {
    /// Tabular files currently in the input source.
    fn source_files(&mut self) -> Result<Vec<String>>;
    /// Manifest of the currently deployed release.
    fn deployed_manifest(&mut self) -> Result<Manifest>;
    /// Full rebuild of the consolidated dataset and staging manifest.
    fn ingest(&mut self) -> Result<()>;
    /// F1 of the production model on the consolidated dataset; writes nothing.
    fn fresh_score(&mut self) -> Result<f64>;
    /// Recorded production score.
    fn production_score(&mut self) -> Result<f64>;
    /// Retrain on the consolidated dataset and record the new staging score.
    fn retrain(&mut self) -> Result<f64>;
    /// Promote staging to production.
    fn deploy(&mut self) -> Result<()>;
}

/// Fresh score strictly below the recorded one.
pub fn is_drift(fresh: f64, production: f64) -> bool {
    fresh < production
}

pub fn run<S: Stages>(stages: &mut S) -> Result<Outcome> {
    info!(stage = Stage::CheckNewData.as_str(), "checking for new data");
    let sources = stages.source_files()?;
    let manifest = stages.deployed_manifest()?;
    if manifest.matches(&sources) {
        info!(
            stage = Stage::CheckNewData.as_str(),
            files = sources.len(),
            "no new data, stopping"
        );
        return Ok(Outcome::NoNewData);
    }
    info!(
        stage = Stage::CheckNewData.as_str(),
        unseen = ?manifest.unseen(&sources),
        "source files changed, re-ingesting"
    );
    stages.ingest()?;

    info!(stage = Stage::NewDataFound.as_str(), "scoring production model on new data");
    let fresh = stages.fresh_score()?;

    let production = stages.production_score()?;
    info!(
        stage = Stage::ScoreComputed.as_str(),
        fresh, production, "compared scores"
    );
    if !is_drift(fresh, production) {
        info!(stage = Stage::ScoreComputed.as_str(), "no model drift, stopping");
        return Ok(Outcome::NoDrift { fresh, production });
    }

    info!(stage = Stage::DriftDetected.as_str(), "model drift detected, retraining");
    let retrained = stages.retrain()?;

    info!(
        stage = Stage::RetrainDone.as_str(),
        retrained, "retrained, re-deploying"
    );
    stages.deploy()?;
    info!("re-deployment complete");

    Ok(Outcome::Redeployed {
        fresh,
        production,
        retrained,
    })
}

// ---------------------------------------------------------------------------
// Filesystem-backed stages
// ---------------------------------------------------------------------------

/// Stages wired to the real ingestor, trainer, scorer and deployer.
pub struct FsStages<'a> {
    cfg: &'a Config,
    handle: Option<&'a ModelHandle>,
}

impl<'a> FsStages<'a> {
    pub fn new(cfg: &'a Config, handle: Option<&'a ModelHandle>) -> Self {
        Self { cfg, handle }
    }
}

impl Stages for FsStages<'_> {
    fn source_files(&mut self) -> Result<Vec<String>> {
        ingestion::source_files(self.cfg)
    }

    fn deployed_manifest(&mut self) -> Result<Manifest> {
        Manifest::load(&paths::production_manifest_path(self.cfg))
    }

    fn ingest(&mut self) -> Result<()> {
        ingestion::ingest(self.cfg).map(|_| ())
    }

    fn fresh_score(&mut self) -> Result<f64> {
        let model = LogisticModel::load(&paths::production_model_path(self.cfg))?;
        let data_path = paths::final_data_path(self.cfg);
        let predictions = model.predict_dataset(&Dataset::read(&data_path)?)?;
        scoring::score_predictions(&predictions, &data_path)
    }

    fn production_score(&mut self) -> Result<f64> {
        Ok(ScoreRecord::load(&paths::production_score_path(self.cfg))?.f1)
    }

    fn retrain(&mut self) -> Result<f64> {
        training::train(self.cfg)?;
        scoring::score_staging(self.cfg)
    }

    fn deploy(&mut self) -> Result<()> {
        deployment::deploy(self.cfg, self.handle).map(|_| ())
    }
}

/// Run the control loop against the configured directories.
pub fn fullprocess(cfg: &Config, handle: Option<&ModelHandle>) -> Result<Outcome> {
    run(&mut FsStages::new(cfg, handle))
}
