use crate::error::{PipelineError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Readers see either the previous contents or the new ones, never a mix.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp = temp_beside(path)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Read a file to a string, reporting a missing file as `ArtifactNotFound`.
pub fn read_artifact(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PipelineError::not_found(path)),
        Err(e) => Err(e.into()),
    }
}

/// Copy `src` into a tempfile next to `dest` without touching `dest` itself.
/// The returned file is moved into place with [`NamedTempFile::persist`].
pub fn stage_copy(src: &Path, dest: &Path) -> Result<NamedTempFile> {
    let mut reader = match std::fs::File::open(src) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::not_found(src))
        }
        Err(e) => return Err(e.into()),
    };
    let mut tmp = temp_beside(dest)?;
    std::io::copy(&mut reader, &mut tmp)?;
    tmp.flush()?;
    Ok(tmp)
}

/// List the file names in `dir` that carry `extension`, sorted.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::not_found(dir))
        }
        Err(e) => return Err(e.into()),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path: PathBuf = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn temp_beside(path: &Path) -> Result<NamedTempFile> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}
