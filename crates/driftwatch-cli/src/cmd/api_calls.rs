use crate::output::print_json;
use anyhow::Context;
use driftwatch_core::{io, paths, PipelineError};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::path::Path;

/// Call every server endpoint in turn and record the combined responses in
/// the model output folder.
pub fn run(root: &Path, url: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let base = url
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", config.server.port));

    let client = Client::new();
    let test_data = paths::test_data_path(&config);

    let prediction = call(
        client
            .post(format!("{base}/prediction"))
            .json(&serde_json::json!({ "dataset_path": test_data })),
        "/prediction",
    )?;
    let scoring = call(client.get(format!("{base}/scoring")), "/scoring")?;
    let summary = call(client.get(format!("{base}/summarystats")), "/summarystats")?;
    let diagnostics = call(client.get(format!("{base}/diagnostics")), "/diagnostics")?;

    let combined = serde_json::json!({
        "prediction": prediction,
        "scoring": scoring,
        "summarystats": summary,
        "diagnostics": diagnostics,
    });

    let out = paths::api_returns_path(&config);
    io::atomic_write(&out, serde_json::to_string_pretty(&combined)?.as_bytes())
        .with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), "api responses recorded");

    if json {
        return print_json(&combined);
    }
    println!("Recorded responses from {base} in {}", out.display());
    Ok(())
}

/// Send one request and return its JSON body. Transport failures and
/// non-success statuses are reported as `ExternalProcess`.
fn call(request: RequestBuilder, endpoint: &str) -> Result<Value, PipelineError> {
    let response = request
        .send()
        .map_err(|e| PipelineError::ExternalProcess(format!("{endpoint}: {e}")))?;
    let status = response.status();
    let body: Value = response
        .json()
        .map_err(|e| PipelineError::ExternalProcess(format!("{endpoint}: invalid JSON: {e}")))?;
    if !status.is_success() {
        let detail = body["error"].as_str().unwrap_or("no error message");
        return Err(PipelineError::ExternalProcess(format!(
            "{endpoint} returned {status}: {detail}"
        )));
    }
    tracing::debug!(endpoint, %status, "api call succeeded");
    Ok(body)
}
