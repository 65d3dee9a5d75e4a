use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ManifestError, Result};
use crate::pattern::FilePattern;

/// Order of entries in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Byte-wise by filename, stable across runs.
    #[default]
    Sorted,
    /// Whatever the directory listing yields.
    Filesystem,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub pattern: FilePattern,
    pub order: Order,
    pub include_hidden: bool,
    /// Filenames never listed, even when they match (the manifest itself).
    pub exclude: Vec<String>,
}

impl ScanOptions {
    pub fn new(pattern: FilePattern) -> Self {
        Self {
            pattern,
            order: Order::default(),
            include_hidden: true,
            exclude: Vec::new(),
        }
    }
}

/// Lists the names of regular files directly inside `dir` matching the pattern.
///
/// Only a failure to read `dir` itself is an error. Entries that cannot be
/// inspected (dangling symlinks, names that are not UTF-8) are skipped.
pub fn scan_directory(dir: &Path, options: &ScanOptions) -> Result<Vec<String>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);
    let walker = match options.order {
        Order::Sorted => walker.sort_by_file_name(),
        Order::Filesystem => walker,
    };

    let mut names = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_root_error(&err, dir) => {
                return Err(ManifestError::ReadDir {
                    path: dir.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                warn!("skipping entry: {}", err);
                continue;
            }
        };

        if let Some(name) = matching_name(&entry, options) {
            debug!(name, "matched");
            names.push(name.to_string());
        }
    }

    Ok(names)
}

fn is_root_error(err: &walkdir::Error, dir: &Path) -> bool {
    err.depth() == 0 || err.path().map_or(true, |p| p == dir)
}

fn matching_name<'a>(entry: &'a DirEntry, options: &ScanOptions) -> Option<&'a str> {
    if !entry.file_type().is_file() {
        return None;
    }

    let Some(name) = entry.file_name().to_str() else {
        warn!(
            "skipping {}: filename is not valid UTF-8",
            entry.path().display()
        );
        return None;
    };

    let wanted = options.pattern.matches(name)
        && (options.include_hidden || !is_hidden(name))
        && !options.exclude.iter().any(|excluded| excluded == name);

    wanted.then_some(name)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
