//! Resource file discovery.
//!
//! Walks an input directory and returns the files worth handing to the
//! documentation generator, honouring exclusion patterns and the ignore file
//! at the root of the scanned directory.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use regex::Regex;
use rfhub_core::Config;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Scanner errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A caller-supplied exclusion pattern is not a valid regex.
    #[error("invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for scanner operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Finds documentable files below a directory.
#[derive(Debug, Clone)]
pub struct PathScanner {
    extensions: Vec<String>,
    patterns: Vec<Regex>,
    ignore_file: Option<String>,
}

impl PathScanner {
    /// Create a scanner accepting the given extensions (with or without the
    /// leading dot) and excluding names matching any of `patterns`.
    pub fn new<S: AsRef<str>>(extensions: &[S], patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| ScanError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .collect(),
            patterns,
            ignore_file: None,
        })
    }

    /// Create a scanner from the `[scan]` configuration section.
    pub fn from_config(config: &Config) -> Result<Self> {
        let scanner = Self::new(
            config.scan.extensions.as_slice(),
            config.scan.exclude.as_slice(),
        )?;
        Ok(if config.scan.ignore_file.is_empty() {
            scanner
        } else {
            scanner.with_ignore_file(&config.scan.ignore_file)
        })
    }

    /// Read additional patterns from a file with this name at the scan root.
    #[must_use]
    pub fn with_ignore_file(mut self, name: impl Into<String>) -> Self {
        self.ignore_file = Some(name.into());
        self
    }

    /// Return the sorted list of documentable files under `root`.
    ///
    /// A missing root, or one that is not a directory, yields an empty list.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            debug!(root = %root.display(), "scan root is not a directory");
            return Vec::new();
        }

        let mut patterns = self.patterns.clone();
        if let Some(ref name) = self.ignore_file {
            patterns.extend(load_ignore_patterns(&root.join(name)));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.file_name(), &patterns))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| self.has_documented_extension(entry.path()))
            .map(walkdir::DirEntry::into_path)
            .collect();

        files.sort();

        info!(root = %root.display(), count = files.len(), "scanned input directory");
        files
    }

    fn has_documented_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

fn is_excluded(name: &OsStr, patterns: &[Regex]) -> bool {
    let name = name.to_string_lossy();
    patterns.iter().any(|p| p.is_match(&name))
}

/// Parse ignore file content: one regex per line, blank lines and `#` comments
/// skipped.
pub fn parse_ignore_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Load and compile patterns from an ignore file. Invalid lines are logged and
/// dropped; a missing file contributes nothing.
fn load_ignore_patterns(path: &Path) -> Vec<Regex> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    parse_ignore_lines(&content)
        .into_iter()
        .filter_map(|line| match Regex::new(&line) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(
                    file = %path.display(),
                    pattern = %line,
                    error = %e,
                    "ignoring invalid pattern"
                );
                None
            }
        })
        .collect()
}
