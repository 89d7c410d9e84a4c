//! External documentation generator capability.
//!
//! The generator is only reachable through its console interface, so every
//! call goes through [`DocBackend`]. Callers never see the captured streams.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use rfhub_core::Config;
use thiserror::Error;
use tracing::{debug, trace};

/// Generator invocation errors.
#[derive(Debug, Error)]
pub enum LibdocError {
    /// The generator process could not be started at all.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The hosting interpreter is too old.
    #[error("unsupported runtime {found}, version {required} or newer is required")]
    UnsupportedRuntime { found: String, required: String },

    /// The interpreter version could not be determined.
    #[error("could not determine runtime version from '{0}'")]
    UnknownVersion(String),
}

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, LibdocError>;

/// A documentation generator for libraries and resource files.
///
/// Implementations must be safe to call many times on one instance.
pub trait DocBackend {
    /// List keyword names for `source`. `None` means the generator rejected it.
    fn list_keywords(&self, source: &str) -> Result<Option<Vec<String>>>;

    /// Render the full documentation page for `source` into `out_file`.
    /// Returns whether the generator reported success.
    fn render(&self, source: &str, out_file: &Path, display_name: &str) -> Result<bool>;

    /// Directories holding installed packages, for library discovery.
    fn package_dirs(&self) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

const SITE_PACKAGES_SCRIPT: &str = "import site, sys\n\
dirs = list(getattr(site, 'getsitepackages', lambda: [])())\n\
user = getattr(site, 'getusersitepackages', lambda: None)()\n\
if user:\n    dirs.append(user)\n\
dirs.extend(p for p in sys.path if p.endswith(('site-packages', 'dist-packages')))\n\
print('\\n'.join(dict.fromkeys(dirs)))";

/// Runs the generator as `<python> -m <module>` subprocesses.
#[derive(Debug, Clone)]
pub struct LibdocCommand {
    python: String,
    module: String,
    min_version: (u32, u32),
}

impl LibdocCommand {
    /// Create a backend using the given interpreter and the default module.
    #[must_use]
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            module: "robot.libdoc".to_string(),
            min_version: (3, 8),
        }
    }

    /// Create a backend from the `[generator]` configuration section.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            python: config.generator.python.clone(),
            module: config.generator.module.clone(),
            min_version: config.min_python_version().unwrap_or((3, 8)),
        }
    }

    /// Interpreter in use.
    #[must_use]
    pub fn python(&self) -> &str {
        &self.python
    }

    /// Verify that the interpreter meets the minimum supported version.
    pub fn check_runtime(&self) -> Result<(u32, u32)> {
        let output = self.run(["--version"])?;
        // Very old interpreters print the version on stderr.
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };

        let found = parse_python_version(&text)
            .ok_or_else(|| LibdocError::UnknownVersion(text.trim().to_string()))?;

        if found < self.min_version {
            return Err(LibdocError::UnsupportedRuntime {
                found: format!("{}.{}", found.0, found.1),
                required: format!("{}.{}", self.min_version.0, self.min_version.1),
            });
        }

        debug!(python = %self.python, major = found.0, minor = found.1, "runtime accepted");
        Ok(found)
    }

    fn run<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.python)
            .args(args)
            .output()
            .map_err(|source| LibdocError::Spawn {
                program: self.python.clone(),
                source,
            })
    }
}

impl DocBackend for LibdocCommand {
    fn list_keywords(&self, source: &str) -> Result<Option<Vec<String>>> {
        let output = self.run(["-m", self.module.as_str(), source, "list"])?;
        if !output.status.success() {
            trace!(
                source,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "generator rejected source"
            );
            return Ok(None);
        }

        Ok(Some(keyword_lines(&String::from_utf8_lossy(&output.stdout))))
    }

    fn render(&self, source: &str, out_file: &Path, display_name: &str) -> Result<bool> {
        let output = self.run([
            OsStr::new("-m"),
            OsStr::new(&self.module),
            OsStr::new("--name"),
            OsStr::new(display_name),
            OsStr::new(source),
            out_file.as_os_str(),
        ])?;

        if !output.status.success() {
            trace!(
                source,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "generator failed to render"
            );
        }
        Ok(output.status.success())
    }

    fn package_dirs(&self) -> Result<Vec<PathBuf>> {
        let output = self.run(["-c", SITE_PACKAGES_SCRIPT])?;
        if !output.status.success() {
            return Ok(Vec::new());
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}

/// Split the generator's keyword listing into names.
pub fn keyword_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse `Python 3.11.4` style output into `(major, minor)`.
pub fn parse_python_version(text: &str) -> Option<(u32, u32)> {
    let version = text.split_whitespace().find(|w| w.starts_with(|c: char| c.is_ascii_digit()))?;
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}
