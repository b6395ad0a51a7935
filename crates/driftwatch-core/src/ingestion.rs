use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::manifest::Manifest;
use crate::paths;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub files: Vec<String>,
    pub rows_read: usize,
    pub rows_written: usize,
    pub duplicates_dropped: usize,
}

/// Tabular source files currently present in the input folder, sorted.
pub fn source_files(cfg: &Config) -> Result<Vec<String>> {
    crate::io::list_files_with_extension(&cfg.input_dir(), paths::DATASET_EXTENSION)
}

/// Rebuild the consolidated dataset and manifest from every source file.
///
/// Both outputs are replaced wholesale; the manifest always lists every file
/// read in this run. Any unreadable file aborts the run before anything is
/// written.
pub fn ingest(cfg: &Config) -> Result<IngestReport> {
    let input = cfg.input_dir();
    let files = source_files(cfg)?;
    if files.is_empty() {
        return Err(PipelineError::ArtifactNotFound(format!(
            "no .{} files in {}",
            paths::DATASET_EXTENSION,
            input.display()
        )));
    }

    let mut combined = Dataset::default();
    for name in &files {
        let part = Dataset::read(&input.join(name))?;
        debug!(file = %name, rows = part.len(), "read source file");
        combined.append(part, name)?;
    }

    let rows_read = combined.len();
    let duplicates_dropped = combined.dedup();

    crate::io::ensure_dir(&cfg.output_dir())?;
    combined.write(&paths::final_data_path(cfg))?;
    Manifest::new(files.clone()).save(&paths::manifest_path(cfg))?;

    info!(
        files = files.len(),
        rows_read,
        rows_written = combined.len(),
        duplicates_dropped,
        "ingestion complete"
    );

    Ok(IngestReport {
        files,
        rows_read,
        rows_written: combined.len(),
        duplicates_dropped,
    })
}
