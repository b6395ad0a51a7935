use crate::output::{print_json, print_table};
use anyhow::Context;
use driftwatch_core::reporting;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let report = reporting::report(&config).context("report failed")?;

    if json {
        return print_json(&report);
    }

    let [[tn, fp], [fn_, tp]] = report.confusion_matrix.rows();
    println!("Confusion matrix on {}:", report.dataset.display());
    print_table(
        &["", "PREDICTED 0", "PREDICTED 1"],
        &[
            vec!["actual 0".to_string(), tn.to_string(), fp.to_string()],
            vec!["actual 1".to_string(), fn_.to_string(), tp.to_string()],
        ],
    );
    println!("F1 Score: {:.4}", report.f1);
    println!("  written: {}", report.path.display());
    Ok(())
}
