use crate::output::print_json;
use anyhow::Context;
use driftwatch_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let config_existed = config_path.exists();
    let config = if config_existed {
        Config::load(root).context("failed to load existing config.yaml")?
    } else {
        let cfg = Config::new(root);
        cfg.save().context("failed to write config.yaml")?;
        cfg
    };

    let dirs = [
        config.input_dir(),
        config.output_dir(),
        config.test_data_dir(),
        config.model_dir(),
        config.production_dir(),
    ];
    for dir in &dirs {
        io::ensure_dir(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let requirements_created = io::write_if_missing(&config.requirements_file(), b"")
        .context("failed to write requirements file")?;
    if let Some(inventory) = config.installed_packages_file() {
        io::write_if_missing(&inventory, b"")
            .context("failed to write installed packages inventory")?;
    }

    tracing::info!(root = %root.display(), "project initialized");

    if json {
        return print_json(&serde_json::json!({
            "root": root,
            "config_created": !config_existed,
            "requirements_created": requirements_created,
            "directories": dirs,
        }));
    }

    println!("Initializing driftwatch in: {}", root.display());
    if config_existed {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        println!("  created: {}", paths::CONFIG_FILE);
    }
    for dir in &dirs {
        println!("  dir:     {}", relative(root, dir));
    }
    if requirements_created {
        println!("  created: {}", relative(root, &config.requirements_file()));
    }
    Ok(())
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
