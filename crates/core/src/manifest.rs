use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ManifestError, Result};

/// How the manifest replaces an existing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Write a sibling temp file, then rename it over the target.
    #[default]
    Atomic,
    /// Truncate the target and write in place.
    Truncate,
}

/// The list of matched filenames. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<String>,
}

/// Names present in one manifest but not the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ManifestDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pretty-printed with two-space indentation and no trailing newline.
    /// An empty manifest renders as `[]`.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    pub fn write_to(&self, path: &Path, mode: WriteMode) -> Result<()> {
        let content = self.to_json()?;
        match mode {
            WriteMode::Atomic => write_atomic(path, content.as_bytes()),
            WriteMode::Truncate => fs::write(path, content).map_err(|source| ManifestError::Write {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Returns what changed going from `previous` to `self`.
    pub fn diff(&self, previous: &Manifest) -> ManifestDiff {
        let current: HashSet<&str> = self.entries.iter().map(String::as_str).collect();
        let before: HashSet<&str> = previous.entries.iter().map(String::as_str).collect();

        ManifestDiff {
            added: self
                .entries
                .iter()
                .filter(|e| !before.contains(e.as_str()))
                .cloned()
                .collect(),
            removed: previous
                .entries
                .iter()
                .filter(|e| !current.contains(e.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let write_err = |source: io::Error| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = resolve_symlink(path).map_err(write_err)?;
    let existing = fs::metadata(&target).ok().filter(|meta| meta.is_file());
    if existing.as_ref().is_some_and(|meta| meta.permissions().readonly()) {
        return Err(write_err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "manifest is read-only",
        )));
    }

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = temp_file_in(dir).map_err(write_err)?;
    tmp.write_all(content).map_err(write_err)?;
    if let Some(meta) = existing {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?;
    }
    tmp.as_file().sync_all().map_err(write_err)?;

    tmp.persist(&target).map_err(|source| ManifestError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// The file a write to `path` lands in. A symlinked manifest is updated
/// through the link, including a dangling one.
fn resolve_symlink(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => Ok(target),
            Err(_) => {
                let link = fs::read_link(path)?;
                Ok(path.parent().map_or(link.clone(), |parent| parent.join(&link)))
            }
        },
        _ => Ok(path.to_path_buf()),
    }
}

/// Temp files start from 0666 so the umask decides a new manifest's mode,
/// as with a plain create.
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
