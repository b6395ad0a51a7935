use axum::extract::State;
use axum::Json;
use driftwatch_core::diagnostics::{self, ColumnSummary};

use crate::error::AppError;
use crate::state::AppState;

/// GET /summarystats: mean, median and std of each feature in the
/// consolidated dataset.
pub async fn summary_stats(
    State(app): State<AppState>,
) -> Result<Json<Vec<ColumnSummary>>, AppError> {
    let config = app.config.clone();
    let stats = tokio::task::spawn_blocking(move || diagnostics::summary_stats(&config))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(stats))
}
