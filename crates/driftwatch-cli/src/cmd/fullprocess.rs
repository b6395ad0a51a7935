use crate::output::print_json;
use anyhow::Context;
use driftwatch_core::drift::{self, Outcome};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let outcome = drift::fullprocess(&config, None).context("full process failed")?;

    if json {
        return print_json(&outcome);
    }

    match outcome {
        Outcome::NoNewData => println!("No new data: production is up to date."),
        Outcome::NoDrift { fresh, production } => println!(
            "No drift: new data scores {fresh:.4} against recorded {production:.4}."
        ),
        Outcome::Redeployed {
            fresh,
            production,
            retrained,
        } => println!(
            "Drift: new data scores {fresh:.4} against recorded {production:.4}. \
             Retrained and redeployed with F1 {retrained:.4}."
        ),
    }
    Ok(())
}
