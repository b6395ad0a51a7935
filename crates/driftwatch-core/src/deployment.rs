use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::handle::ModelHandle;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub production_dir: PathBuf,
    pub files: Vec<String>,
    pub deployed_at: DateTime<Utc>,
}

/// The staging artifacts promoted together, as (source, production file name).
pub fn release_set(cfg: &Config) -> [(PathBuf, &'static str); 3] {
    [
        (paths::staging_model_path(cfg), paths::MODEL_FILE),
        (paths::staging_score_path(cfg), paths::SCORE_FILE),
        (paths::manifest_path(cfg), paths::MANIFEST_FILE),
    ]
}

/// Promote the staging model, score record and manifest into production.
///
/// Every source must exist before anything is written. Each file is first
/// copied to a tempfile inside the production directory; the renames into
/// place happen only after all three copies succeeded. When `handle` is
/// given it is reloaded from the promoted model.
pub fn deploy(cfg: &Config, handle: Option<&ModelHandle>) -> Result<DeployReport> {
    let set = release_set(cfg);
    for (src, _) in &set {
        if !src.is_file() {
            return Err(PipelineError::not_found(src));
        }
    }

    let prod = cfg.production_dir();
    crate::io::ensure_dir(&prod)?;

    let mut staged = Vec::with_capacity(set.len());
    for (src, name) in &set {
        let dest = prod.join(name);
        staged.push((crate::io::stage_copy(src, &dest)?, dest));
    }
    for (tmp, dest) in staged {
        tmp.persist(&dest).map_err(|e| e.error)?;
    }

    if let Some(handle) = handle {
        handle.reload(&paths::production_model_path(cfg))?;
    }

    let files: Vec<String> = set.iter().map(|(_, name)| name.to_string()).collect();
    info!(dir = %prod.display(), files = ?files, "deployed to production");

    Ok(DeployReport {
        production_dir: prod,
        files,
        deployed_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::model::tests::fixed_model;
    use crate::scoring::ScoreRecord;
    use tempfile::TempDir;

    fn staged(dir: &TempDir) -> Config {
        let cfg = Config::new(dir.path());
        fixed_model([1.0, 2.0, 3.0], 0.5)
            .save(&paths::staging_model_path(&cfg))
            .unwrap();
        ScoreRecord::new(0.8)
            .save(&paths::staging_score_path(&cfg))
            .unwrap();
        Manifest::new(vec!["a.csv".into()])
            .save(&paths::manifest_path(&cfg))
            .unwrap();
        cfg
    }

    #[test]
    fn copies_all_three_artifacts() {
        let dir = TempDir::new().unwrap();
        let cfg = staged(&dir);
        let report = deploy(&cfg, None).unwrap();
        assert_eq!(report.files.len(), 3);
        for (src, name) in release_set(&cfg) {
            let dest = cfg.production_dir().join(name);
            assert_eq!(std::fs::read(&src).unwrap(), std::fs::read(&dest).unwrap());
        }
    }

    #[test]
    fn missing_source_leaves_production_untouched() {
        let dir = TempDir::new().unwrap();
        let cfg = staged(&dir);
        deploy(&cfg, None).unwrap();
        let before = std::fs::read(paths::production_model_path(&cfg)).unwrap();

        fixed_model([9.0, 9.0, 9.0], 9.0)
            .save(&paths::staging_model_path(&cfg))
            .unwrap();
        std::fs::remove_file(paths::staging_score_path(&cfg)).unwrap();

        let err = deploy(&cfg, None).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactNotFound(_)));
        assert_eq!(
            std::fs::read(paths::production_model_path(&cfg)).unwrap(),
            before
        );
    }

    #[test]
    fn deploy_creates_production_dir() {
        let dir = TempDir::new().unwrap();
        let cfg = staged(&dir);
        assert!(!cfg.production_dir().exists());
        deploy(&cfg, None).unwrap();
        assert!(cfg.production_dir().is_dir());
    }

    #[test]
    fn deploy_swaps_the_handle() {
        let dir = TempDir::new().unwrap();
        let cfg = staged(&dir);
        let handle = ModelHandle::empty();
        deploy(&cfg, Some(&handle)).unwrap();
        assert_eq!(handle.require().unwrap().weights, vec![1.0, 2.0, 3.0]);
    }
}
