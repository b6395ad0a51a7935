use crate::output::print_json;
use anyhow::Context;
use driftwatch_core::{ingestion, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let report = ingestion::ingest(&config).context("ingestion failed")?;

    if json {
        return print_json(&report);
    }

    println!(
        "Ingested {} file(s): {} rows read, {} duplicate(s) dropped, {} rows written",
        report.files.len(),
        report.rows_read,
        report.duplicates_dropped,
        report.rows_written
    );
    for f in &report.files {
        println!("  {f}");
    }
    println!("  dataset:  {}", paths::final_data_path(&config).display());
    println!("  manifest: {}", paths::manifest_path(&config).display());
    Ok(())
}
