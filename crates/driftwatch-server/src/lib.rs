pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use driftwatch_core::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(config: Config) -> Router {
    router_with_state(state::AppState::new(config))
}

/// Build the router around an existing state, sharing its model handle.
pub fn router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/prediction", post(routes::prediction::predict))
        .route("/scoring", get(routes::scoring::score))
        .route("/summarystats", get(routes::summary::summary_stats))
        .route("/diagnostics", get(routes::diagnostics::diagnostics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the prediction server on `0.0.0.0:<port>`.
pub async fn serve(config: Config, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(config, listener).await
}

/// Start the server on a pre-bound listener.
///
/// Lets the caller bind `port = 0` and read the actual port before serving.
pub async fn serve_on(config: Config, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(config);

    tracing::info!("driftwatch server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
