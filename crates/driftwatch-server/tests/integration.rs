use axum::http::StatusCode;
use driftwatch_core::config::Config;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const HEADER: &str = "corporation,lastmonth_activity,lastyear_activity,number_of_employees,exited";

fn write_csv(dir: &std::path::Path, name: &str, rows: &[String]) {
    std::fs::create_dir_all(dir).unwrap();
    let mut body = format!("{HEADER}\n");
    for r in rows {
        body.push_str(r);
        body.push('\n');
    }
    std::fs::write(dir.join(name), body).unwrap();
}

/// Rows where heavy recent activity means the corporation exited.
fn rows(prefix: &str, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let exited = i % 2;
            let activity = if exited == 1 { 400 + i * 10 } else { 5 + i };
            format!("{prefix}{i},{activity},{},{},{exited}", 100 + i, 10 + i)
        })
        .collect()
}

/// Write source and test data for a fresh project, without deploying.
fn init_project(dir: &TempDir) -> Config {
    let cfg = Config::new(dir.path());
    cfg.save().unwrap();
    write_csv(&cfg.input_dir(), "dataset1.csv", &rows("a", 12));
    write_csv(&cfg.input_dir(), "dataset2.csv", &rows("b", 8));
    write_csv(&cfg.test_data_dir(), "testdata.csv", &rows("t", 6));
    std::fs::write(cfg.requirements_file(), "numpy==1.26.4\nscipy==1.11.0\n").unwrap();
    std::fs::write(
        cfg.installed_packages_file().unwrap(),
        "numpy==1.26.0\nscipy==1.11.0\n",
    )
    .unwrap();
    cfg
}

/// Run the bootstrap pipeline through deployment.
fn deploy_project(cfg: &Config) {
    driftwatch_core::ingestion::ingest(cfg).unwrap();
    driftwatch_core::training::train(cfg).unwrap();
    driftwatch_core::scoring::score_staging(cfg).unwrap();
    driftwatch_core::deployment::deploy(cfg, None).unwrap();
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Before deployment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn prediction_without_model_returns_503() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    let app = driftwatch_server::build_router(cfg);

    let (status, json) = post_json(
        app,
        "/prediction",
        serde_json::json!({ "dataset_path": "testdata/testdata.csv" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("no production model"));
}

#[tokio::test]
async fn scoring_without_model_returns_503() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    let app = driftwatch_server::build_router(cfg);

    let (status, _) = get(app, "/scoring").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn summarystats_before_ingestion_returns_404() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    let app = driftwatch_server::build_router(cfg);

    let (status, json) = get(app, "/summarystats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("finaldata.csv"));
}

// ---------------------------------------------------------------------------
// After deployment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn prediction_returns_one_label_per_row() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    deploy_project(&cfg);
    let app = driftwatch_server::build_router(cfg);

    let (status, json) = post_json(
        app,
        "/prediction",
        serde_json::json!({ "dataset_path": "testdata/testdata.csv" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let labels = json.as_array().unwrap();
    assert_eq!(labels.len(), 6);
    assert!(labels.iter().all(|l| l == 0 || l == 1));
}

#[tokio::test]
async fn prediction_accepts_absolute_paths() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    deploy_project(&cfg);
    let path = cfg.input_dir().join("dataset2.csv");
    let app = driftwatch_server::build_router(cfg);

    let (status, json) = post_json(
        app,
        "/prediction",
        serde_json::json!({ "dataset_path": path.display().to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn prediction_with_missing_dataset_returns_404() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    deploy_project(&cfg);
    let app = driftwatch_server::build_router(cfg);

    let (status, _) = post_json(
        app,
        "/prediction",
        serde_json::json!({ "dataset_path": "nowhere.csv" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn prediction_with_empty_path_returns_400() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    deploy_project(&cfg);
    let app = driftwatch_server::build_router(cfg);

    let (status, _) =
        post_json(app, "/prediction", serde_json::json!({ "dataset_path": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scoring_matches_recorded_production_score() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    deploy_project(&cfg);
    let recorded = driftwatch_core::scoring::ScoreRecord::load(
        &driftwatch_core::paths::production_score_path(&cfg),
    )
    .unwrap();
    let score_before = std::fs::read(driftwatch_core::paths::production_score_path(&cfg)).unwrap();
    let app = driftwatch_server::build_router(cfg.clone());

    let (status, json) = get(app, "/scoring").await;
    assert_eq!(status, StatusCode::OK);
    let f1 = json["f1_score"].as_f64().unwrap();
    assert!((f1 - recorded.f1).abs() < 1e-12);
    assert_eq!(
        std::fs::read(driftwatch_core::paths::production_score_path(&cfg)).unwrap(),
        score_before
    );
}

#[tokio::test]
async fn summarystats_lists_three_features() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    deploy_project(&cfg);
    let app = driftwatch_server::build_router(cfg);

    let (status, json) = get(app, "/summarystats").await;
    assert_eq!(status, StatusCode::OK);
    let stats = json.as_array().unwrap();
    assert_eq!(stats.len(), 3);
    assert_eq!(stats[0]["column"], "lastmonth_activity");
    assert!(stats[2]["median"].as_f64().is_some());
    assert!(stats[2]["std"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn diagnostics_reports_timings_missing_data_and_packages() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    deploy_project(&cfg);
    let app = driftwatch_server::build_router(cfg);

    let (status, json) = get(app, "/diagnostics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["execution_time"]["ingestion_secs"].as_f64().unwrap() >= 0.0);
    assert!(json["execution_time"]["training_secs"].as_f64().unwrap() >= 0.0);
    let missing = json["missing_data"].as_array().unwrap();
    assert!(missing.iter().all(|m| m["percent"] == 0.0));
    let outdated = json["outdated_packages"].as_array().unwrap();
    assert_eq!(outdated.len(), 1);
    assert_eq!(outdated[0]["name"], "numpy");
    assert_eq!(outdated[0]["installed"], "1.26.0");
    assert_eq!(outdated[0]["required"], "1.26.4");
}

#[tokio::test]
async fn shared_handle_serves_model_deployed_after_startup() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    let state = driftwatch_server::state::AppState::new(cfg.clone());

    let (status, _) = get(driftwatch_server::router_with_state(state.clone()), "/scoring").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    driftwatch_core::ingestion::ingest(&cfg).unwrap();
    driftwatch_core::training::train(&cfg).unwrap();
    driftwatch_core::scoring::score_staging(&cfg).unwrap();
    driftwatch_core::deployment::deploy(&cfg, Some(&state.model)).unwrap();

    let (status, json) = get(driftwatch_server::router_with_state(state), "/scoring").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["f1_score"].as_f64().is_some());
}

#[tokio::test]
async fn watcher_picks_up_deploy_made_outside_the_server() {
    let dir = TempDir::new().unwrap();
    let cfg = init_project(&dir);
    let state = driftwatch_server::state::AppState::new(cfg.clone());
    assert!(!state.model.is_loaded());

    // Deploy without the shared handle, as the CLI would, before the
    // watcher has had a chance to poll.
    deploy_project(&cfg);

    tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
    assert!(state.model.is_loaded());

    let (status, json) = get(driftwatch_server::router_with_state(state), "/scoring").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["f1_score"].as_f64().is_some());
}
