use crate::output::print_json;
use anyhow::Context;
use driftwatch_core::deployment;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let report = deployment::deploy(&config, None).context("deployment failed")?;

    if json {
        return print_json(&report);
    }

    println!("Deployed to {}", report.production_dir.display());
    for f in &report.files {
        println!("  {f}");
    }
    Ok(())
}
