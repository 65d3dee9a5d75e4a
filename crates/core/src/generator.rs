use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ManifestError, Result};
use crate::manifest::{Manifest, ManifestDiff};
use crate::scanner::scan_directory;

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub manifest: Manifest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    UpToDate,
    Missing,
    /// The file differs from a fresh scan. The diff is empty when only order
    /// or formatting changed.
    Stale(ManifestDiff),
}

impl CheckOutcome {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::UpToDate)
    }
}

/// Scans `dir` and returns the manifest without touching the filesystem.
pub fn build_manifest(dir: &Path, config: &Config) -> Result<Manifest> {
    let options = config.scan_options(dir)?;
    debug!(dir = %dir.display(), pattern = %options.pattern, "scanning");
    scan_directory(dir, &options).map(Manifest::from_entries)
}

/// Scans `dir` and replaces the configured output file with the result.
pub fn generate(dir: &Path, config: &Config) -> Result<GenerateReport> {
    let manifest = build_manifest(dir, config)?;
    let output = config.output_path(dir);

    manifest.write_to(&output, config.write_mode)?;
    info!(
        path = %output.display(),
        entries = manifest.count(),
        "wrote manifest"
    );

    Ok(GenerateReport { output, manifest })
}

/// Compares a fresh scan of `dir` with the output file on disk.
pub fn check(dir: &Path, config: &Config) -> Result<CheckOutcome> {
    let manifest = build_manifest(dir, config)?;
    let output = config.output_path(dir);

    let on_disk = match std::fs::read_to_string(&output) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CheckOutcome::Missing),
        Err(source) => return Err(ManifestError::Read { path: output, source }),
    };

    if on_disk == manifest.to_json()? {
        return Ok(CheckOutcome::UpToDate);
    }

    let previous = serde_json::from_str::<Manifest>(&on_disk).unwrap_or_else(|e| {
        debug!(path = %output.display(), "existing manifest unreadable: {}", e);
        Manifest::new()
    });
    Ok(CheckOutcome::Stale(manifest.diff(&previous)))
}
