use axum::extract::State;
use axum::Json;
use driftwatch_core::diagnostics::model_predictions;
use driftwatch_core::paths;
use driftwatch_core::scoring::score_predictions;

use crate::error::AppError;
use crate::state::AppState;

/// GET /scoring: F1 of the production model on the test dataset.
///
/// Reads the in-memory model and writes nothing.
pub async fn score(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let model = app.model.require()?;
    let config = app.config.clone();
    let f1 = tokio::task::spawn_blocking(move || {
        let dataset = paths::test_data_path(&config);
        let predictions = model_predictions(&model, &dataset)?;
        score_predictions(&predictions, &dataset)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "f1_score": f1 })))
}
