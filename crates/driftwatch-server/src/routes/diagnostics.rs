use axum::extract::State;
use axum::Json;
use driftwatch_core::diagnostics::{self, DiagnosticsReport};

use crate::error::AppError;
use crate::state::AppState;

/// GET /diagnostics: stage timings, missing data and outdated packages.
///
/// Timing re-runs ingestion, training and staging scoring, which rewrites
/// staging artifacts.
/// Production is never touched.
pub async fn diagnostics(
    State(app): State<AppState>,
) -> Result<Json<DiagnosticsReport>, AppError> {
    let config = app.config.clone();
    let report = tokio::task::spawn_blocking(move || diagnostics::run(&config))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(report))
}
