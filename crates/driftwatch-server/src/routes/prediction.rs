use axum::extract::State;
use axum::Json;
use driftwatch_core::diagnostics::model_predictions;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct PredictionBody {
    pub dataset_path: String,
}

/// POST /prediction: predicted labels for every row of `dataset_path`.
///
/// Uses the in-memory production model. Relative paths resolve against the
/// project root.
pub async fn predict(
    State(app): State<AppState>,
    Json(body): Json<PredictionBody>,
) -> Result<Json<Vec<u8>>, AppError> {
    let dataset_path = body.dataset_path.trim();
    if dataset_path.is_empty() {
        return Err(AppError::bad_request("dataset_path must not be empty"));
    }
    let model = app.model.require()?;
    let path = app.config.resolve(std::path::Path::new(dataset_path));

    let predictions = tokio::task::spawn_blocking(move || model_predictions(&model, &path))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::debug!(rows = predictions.len(), "served predictions");
    Ok(Json(predictions))
}
