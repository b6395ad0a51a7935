use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not initialized: run 'driftwatch init'")]
    NotInitialized,

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("data schema error: {0}")]
    DataSchema(String),

    #[error("external process failed: {0}")]
    ExternalProcess(String),

    #[error("no production model loaded")]
    ModelNotLoaded,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub fn not_found(path: &std::path::Path) -> Self {
        PipelineError::ArtifactNotFound(path.display().to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
