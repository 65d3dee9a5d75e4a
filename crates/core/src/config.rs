use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ManifestError, Result};
use crate::manifest::WriteMode;
use crate::pattern::FilePattern;
use crate::scanner::{Order, ScanOptions};

pub const DEFAULT_PATTERN: &str = "*.html";
pub const DEFAULT_OUTPUT: &str = "tools.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub pattern: String,
    /// Relative paths resolve against the scanned directory.
    pub output: PathBuf,
    pub ignore_case: bool,
    pub order: Order,
    pub write_mode: WriteMode,
    pub include_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            ignore_case: false,
            order: Order::Sorted,
            write_mode: WriteMode::Atomic,
            include_hidden: true,
        }
    }
}

impl Config {
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

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.output)
    }

    /// Scan options for `dir`. When the output lives in `dir` its own name is
    /// excluded so a pattern like `*.json` never lists the manifest.
    pub fn scan_options(&self, dir: &Path) -> Result<ScanOptions> {
        let pattern = FilePattern::new(&self.pattern, self.ignore_case)?;
        let output = self.output_path(dir);

        let exclude = match (output.parent(), output.file_name()) {
            (Some(parent), Some(name)) if same_dir(parent, dir) => {
                name.to_str().map(str::to_string).into_iter().collect()
            }
            _ => Vec::new(),
        };

        Ok(ScanOptions {
            pattern,
            order: self.order,
            include_hidden: self.include_hidden,
            exclude,
        })
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    a == b
        || matches!(
            (fs::canonicalize(a), fs::canonicalize(b)),
            (Ok(a), Ok(b)) if a == b
        )
}
