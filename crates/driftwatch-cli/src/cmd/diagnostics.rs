use crate::output::{fmt_opt, print_json, print_table};
use anyhow::Context;
use driftwatch_core::diagnostics;
use driftwatch_core::model::LogisticModel;
use driftwatch_core::{paths, PipelineError};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let report = diagnostics::run(&config).context("diagnostics failed")?;
    let summary = diagnostics::summary_stats(&config).context("summary statistics failed")?;

    let predictions = match LogisticModel::load(&paths::production_model_path(&config)) {
        Ok(model) => Some(
            diagnostics::model_predictions(&model, &paths::test_data_path(&config))
                .context("prediction on test data failed")?,
        ),
        Err(PipelineError::ArtifactNotFound(path)) => {
            tracing::warn!("no production model at {path}, skipping predictions");
            None
        }
        Err(e) => return Err(e).context("failed to load production model"),
    };

    if json {
        return print_json(&serde_json::json!({
            "execution_time": report.execution_time,
            "missing_data": report.missing_data,
            "outdated_packages": report.outdated_packages,
            "summary_stats": summary,
            "predictions": predictions,
        }));
    }

    println!(
        "Execution time: ingestion {:.3}s, training {:.3}s",
        report.execution_time.ingestion_secs, report.execution_time.training_secs
    );

    println!("\nSummary statistics:");
    print_table(
        &["COLUMN", "MEAN", "MEDIAN", "STD"],
        &summary
            .iter()
            .map(|s| {
                vec![
                    s.column.clone(),
                    fmt_opt(s.mean),
                    fmt_opt(s.median),
                    fmt_opt(s.std),
                ]
            })
            .collect::<Vec<_>>(),
    );

    println!("\nMissing data:");
    print_table(
        &["COLUMN", "PERCENT"],
        &report
            .missing_data
            .iter()
            .map(|m| vec![m.column.clone(), format!("{:.2}", m.percent)])
            .collect::<Vec<_>>(),
    );

    if report.outdated_packages.is_empty() {
        println!("\nAll pinned packages are up to date.");
    } else {
        println!("\nOutdated packages:");
        print_table(
            &["NAME", "INSTALLED", "REQUIRED"],
            &report
                .outdated_packages
                .iter()
                .map(|p| {
                    vec![
                        p.name.clone(),
                        p.installed.clone().unwrap_or_else(|| "-".to_string()),
                        p.required.clone(),
                    ]
                })
                .collect::<Vec<_>>(),
        );
    }

    if let Some(predictions) = predictions {
        let text: Vec<String> = predictions.iter().map(u8::to_string).collect();
        println!("\nTest predictions: [{}]", text.join(", "));
    }
    Ok(())
}
