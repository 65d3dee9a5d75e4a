pub mod config;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod pattern;
pub mod scanner;
#[cfg(test)]
mod testutils;

pub use config::{Config, DEFAULT_OUTPUT, DEFAULT_PATTERN};
pub use error::{ManifestError, Result};
pub use generator::{build_manifest, check, generate, CheckOutcome, GenerateReport};
pub use manifest::{Manifest, ManifestDiff, WriteMode};
pub use pattern::FilePattern;
pub use scanner::{scan_directory, Order, ScanOptions};
