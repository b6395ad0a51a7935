use driftwatch_core::config::Config;
use driftwatch_core::handle::ModelHandle;
use driftwatch_core::paths;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: ModelHandle,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let model = ModelHandle::empty();
        let model_path = paths::production_model_path(&config);
        // Baseline before the first load so a deploy landing before the
        // first poll still registers as a change.
        let baseline = std::fs::metadata(&model_path)
            .and_then(|m| m.modified())
            .ok();
        match model.reload(&model_path) {
            Ok(()) => tracing::info!(path = %model_path.display(), "production model loaded"),
            Err(e) => tracing::warn!("no production model at startup: {e}"),
        }
        let state = Self::with_handle(config, model);

        // Watch the production model's mtime and swap it in when it changes.
        // This catches both CLI deploys and full-process runs.
        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let handle = state.model.clone();
            tokio::spawn(async move {
                let mut last_mtime = baseline;
                loop {
                    tokio::time::sleep(std::time::Duration::from_millis(800)).await;
                    let Ok(mtime) = tokio::fs::metadata(&model_path)
                        .await
                        .and_then(|m| m.modified())
                    else {
                        continue;
                    };
                    if last_mtime == Some(mtime) {
                        continue;
                    }
                    last_mtime = Some(mtime);
                    let handle = handle.clone();
                    let path = model_path.clone();
                    let reloaded =
                        tokio::task::spawn_blocking(move || handle.reload(&path)).await;
                    match reloaded {
                        Ok(Ok(())) => tracing::info!("production model reloaded"),
                        Ok(Err(e)) => tracing::warn!("production model reload failed: {e}"),
                        Err(e) => tracing::warn!("reload task join error: {e}"),
                    }
                }
            });
        }

        state
    }

    /// State around an already-populated handle. Spawns no watcher.
    pub fn with_handle(config: Config, model: ModelHandle) -> Self {
        Self {
            config: Arc::new(config),
            model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_keeps_project_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(Config::new(dir.path()));
        assert_eq!(state.config.root(), dir.path());
        assert!(!state.model.is_loaded());
    }

    #[test]
    fn new_state_loads_deployed_model() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = Config::new(dir.path());
        let model = serde_json::json!({
            "features": ["lastmonth_activity", "lastyear_activity", "number_of_employees"],
            "weights": [0.1, 0.2, 0.3],
            "intercept": 0.0,
            "hyperparameters": {},
            "trained_at": "2024-01-01T00:00:00Z",
        });
        let path = paths::production_model_path(&cfg);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, model.to_string()).unwrap();

        let state = AppState::new(cfg);
        assert_eq!(state.model.require().unwrap().weights, vec![0.1, 0.2, 0.3]);
    }
}
