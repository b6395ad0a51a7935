use crate::output::print_json;
use anyhow::Context;
use driftwatch_core::{paths, scoring};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let f1 = scoring::score_staging(&config).context("scoring failed")?;
    let score_path = paths::staging_score_path(&config);

    if json {
        return print_json(&serde_json::json!({
            "f1_score": f1,
            "path": score_path,
        }));
    }

    println!("{}", scoring::ScoreRecord::new(f1).render());
    println!("  recorded: {}", score_path.display());
    Ok(())
}
