use crate::output::{fmt_opt, print_json};
use anyhow::Context;
use driftwatch_core::training;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let report = training::train(&config).context("training failed")?;

    if json {
        return print_json(&report);
    }

    println!(
        "Trained on {} rows ({} held out) in {} iteration(s){}",
        report.train_rows,
        report.holdout_rows,
        report.iterations,
        if report.converged { "" } else { ", not converged" }
    );
    println!("  holdout F1: {}", fmt_opt(report.holdout_f1));
    println!("  model:      {}", report.model_path.display());
    Ok(())
}
