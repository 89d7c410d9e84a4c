//! Static asset handling.
//!
//! Writes the built-in stylesheet and search script used by the index page,
//! then copies any user-supplied assets over them.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

/// Output subdirectory for static assets.
pub const STATIC_DIR: &str = "static";

/// Built-in assets as `(file name, content)`.
pub const BUILTIN_ASSETS: &[(&str, &str)] = &[
    ("style.css", include_str!("../assets/style.css")),
    ("search.js", include_str!("../assets/search.js")),
];

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Installs the assets referenced by the index page.
#[derive(Debug, Default)]
pub struct AssetProcessor {
    extra_dir: Option<PathBuf>,
}

impl AssetProcessor {
    /// Create a processor installing only the built-in assets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also copy the contents of `dir`, overriding built-ins with the same name.
    #[must_use]
    pub fn with_extra_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_dir = Some(dir.into());
        self
    }

    /// Install all assets into `<out_dir>/static`. Returns the number of files
    /// written.
    pub fn process(&self, out_dir: &Path) -> Result<usize> {
        let dest = out_dir.join(STATIC_DIR);
        fs::create_dir_all(&dest)?;

        for (name, content) in BUILTIN_ASSETS {
            fs::write(dest.join(name), content)?;
        }
        let mut count = BUILTIN_ASSETS.len();

        if let Some(ref extra) = self.extra_dir {
            if extra.is_dir() {
                info!(source = %extra.display(), "copying static assets");
                let mut copied = 0;
                self.process_dir(extra, extra, &dest, &mut copied)?;
                count += copied;
            } else {
                debug!(source = %extra.display(), "static directory does not exist, skipping");
            }
        }

        info!(count, dest = %dest.display(), "assets installed");
        Ok(count)
    }

    /// Recursively copy a directory.
    fn process_dir(
        &self,
        base_dir: &Path,
        current_dir: &Path,
        dest_base: &Path,
        copied: &mut usize,
    ) -> Result<()> {
        let mut entries: Vec<_> = fs::read_dir(current_dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|e| e.path())
            .collect();
        entries.sort();

        for path in entries {
            // Skip hidden files/directories
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            {
                continue;
            }

            if path.is_dir() {
                self.process_dir(base_dir, &path, dest_base, copied)?;
            } else if path.is_file() {
                let relative = path
                    .strip_prefix(base_dir)
                    .map_err(|_| AssetError::InvalidPath(path.clone()))?;
                let dest_path = dest_base.join(relative);
                if let Some(parent) = dest_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&path, &dest_path)?;
                *copied += 1;

                debug!(src = %path.display(), dest = %dest_path.display(), "copied asset");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_builtin_assets_written() {
        let out = TempDir::new().unwrap();

        let count = AssetProcessor::new().process(out.path()).unwrap();

        assert_eq!(count, BUILTIN_ASSETS.len());
        assert!(out.path().join("static/style.css").is_file());
        let js = fs::read_to_string(out.path().join("static/search.js")).unwrap();
        assert!(js.contains("RFHUB_SEARCH_DATA"));
    }

    #[test]
    fn test_extra_dir_overrides_and_extends() {
        let out = TempDir::new().unwrap();
        let extra = TempDir::new().unwrap();
        fs::write(extra.path().join("style.css"), "body { color: red; }").unwrap();
        fs::create_dir_all(extra.path().join("img")).unwrap();
        fs::write(extra.path().join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(extra.path().join(".DS_Store"), "junk").unwrap();

        let count = AssetProcessor::new()
            .with_extra_dir(extra.path())
            .process(out.path())
            .unwrap();

        assert_eq!(count, BUILTIN_ASSETS.len() + 2);
        assert_eq!(
            fs::read_to_string(out.path().join("static/style.css")).unwrap(),
            "body { color: red; }"
        );
        assert!(out.path().join("static/img/logo.svg").is_file());
        assert!(!out.path().join("static/.DS_Store").exists());
    }

    #[test]
    fn test_missing_extra_dir_is_skipped() {
        let out = TempDir::new().unwrap();
        let count = AssetProcessor::new()
            .with_extra_dir("/nonexistent/rfhub/static")
            .process(out.path())
            .unwrap();
        assert_eq!(count, BUILTIN_ASSETS.len());
    }
}
