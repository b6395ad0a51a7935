use crate::error::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// Record of the source files folded into the consolidated dataset.
/// Persisted as plain text, one file name per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    files: Vec<String>,
}

impl Manifest {
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }

    pub fn parse(text: &str) -> Self {
        let files = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { files }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for f in &self.files {
            out.push_str(f);
            out.push('\n');
        }
        out
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = crate::io::read_artifact(path)?;
        Ok(Self::parse(&text))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::atomic_write(path, self.render().as_bytes())
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn as_set(&self) -> BTreeSet<&str> {
        self.files.iter().map(String::as_str).collect()
    }

    /// True when `sources` names exactly the files recorded here,
    /// ignoring order and repeats.
    pub fn matches(&self, sources: &[String]) -> bool {
        let theirs: BTreeSet<&str> = sources.iter().map(String::as_str).collect();
        self.as_set() == theirs
    }

    /// Source names not recorded in this manifest.
    pub fn unseen<'a>(&self, sources: &'a [String]) -> Vec<&'a str> {
        let ours = self.as_set();
        sources
            .iter()
            .map(String::as_str)
            .filter(|s| !ours.contains(s))
            .collect()
    }
}
