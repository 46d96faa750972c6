use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::io::open_maybe_gz;
use crate::signals::{SignalSet, SignalSource};

/// `{"as_of": "...", "signals": {"name": value}}`, optionally gzip-compressed.
#[derive(Debug, Clone)]
pub struct JsonSignalFile {
    path: PathBuf,
}

impl JsonSignalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SignalSource for JsonSignalFile {
    fn name(&self) -> &'static str {
        "signals_file"
    }

    fn fetch_signals(&self, _config: &SiteConfig) -> Result<SignalSet> {
        let reader = open_maybe_gz(&self.path)
            .with_context(|| format!("failed to open signals file {}", self.path.display()))?;
        let set: SignalSet = serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse signals file {}", self.path.display()))?;
        Ok(set)
    }
}
