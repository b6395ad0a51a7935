use crate::error::{PipelineError, Result};
use crate::model::LogisticModel;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Shared, swappable reference to the production model.
///
/// Readers take an `Arc` snapshot and keep using it even if a newer model is
/// swapped in mid-request. Only promotion (or a reload of the promoted file)
/// replaces the inner model.
#[derive(Debug, Clone, Default)]
pub struct ModelHandle {
    inner: Arc<RwLock<Option<Arc<LogisticModel>>>>,
}

impl ModelHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: LogisticModel) -> Self {
        let handle = Self::default();
        handle.swap(model);
        handle
    }

    pub fn current(&self) -> Option<Arc<LogisticModel>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Snapshot of the current model, or `ModelNotLoaded`.
    pub fn require(&self) -> Result<Arc<LogisticModel>> {
        self.current().ok_or(PipelineError::ModelNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    pub fn swap(&self, model: LogisticModel) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::new(model));
    }

    /// Load `path` and swap it in. On error the previous model stays.
    pub fn reload(&self, path: &Path) -> Result<()> {
        let model = LogisticModel::load(path)?;
        self.swap(model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::fixed_model;
    use tempfile::TempDir;

    #[test]
    fn empty_handle_reports_not_loaded() {
        let h = ModelHandle::empty();
        assert!(!h.is_loaded());
        assert!(matches!(h.require(), Err(PipelineError::ModelNotLoaded)));
    }

    #[test]
    fn snapshot_survives_swap() {
        let h = ModelHandle::with_model(fixed_model([1.0, 0.0, 0.0], 0.0));
        let before = h.require().unwrap();
        h.swap(fixed_model([2.0, 0.0, 0.0], 0.0));
        assert_eq!(before.weights[0], 1.0);
        assert_eq!(h.require().unwrap().weights[0], 2.0);
    }

    #[test]
    fn clones_share_the_same_slot() {
        let h = ModelHandle::empty();
        let reader = h.clone();
        h.swap(fixed_model([0.5, 0.0, 0.0], 0.0));
        assert!(reader.is_loaded());
    }

    #[test]
    fn failed_reload_keeps_previous_model() {
        let dir = TempDir::new().unwrap();
        let h = ModelHandle::with_model(fixed_model([3.0, 0.0, 0.0], 0.0));
        assert!(h.reload(&dir.path().join("missing.json")).is_err());
        assert_eq!(h.require().unwrap().weights[0], 3.0);
    }
}
