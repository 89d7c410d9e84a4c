//! Generator configuration management.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Standard libraries shipped with the framework that are worth documenting.
///
/// `Easter` and `Reserved` are deliberately absent.
pub const STANDARD_LIBRARIES: &[&str] = &[
    "BuiltIn",
    "Collections",
    "DateTime",
    "Dialogs",
    "OperatingSystem",
    "Process",
    "Remote",
    "Screenshot",
    "String",
    "Telnet",
    "XML",
];

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// External documentation generator settings.
    pub generator: GeneratorConfig,

    /// Library documentation settings.
    pub libraries: LibraryConfig,

    /// Resource directory scanning settings.
    pub scan: ScanConfig,

    /// Output settings.
    pub output: OutputConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Title of the index page.
    pub title: String,
}

/// How to reach the external documentation generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Interpreter hosting the generator.
    pub python: String,

    /// Module run with `-m`.
    pub module: String,

    /// Minimum supported interpreter version, as `major.minor`.
    pub min_python: String,
}

/// Library documentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Built-in framework libraries to document.
    pub builtin: Vec<String>,

    /// Whether to look for installed library packages.
    pub discover: bool,

    /// Distribution name installed packages must depend on.
    pub framework: String,

    /// Importable names starting with this prefix are never documented.
    pub exclude_prefix: String,

    /// Package directories to inspect. Empty means ask the interpreter.
    pub site_packages: Vec<PathBuf>,
}

/// Resource scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions (without the dot) that are documented.
    pub extensions: Vec<String>,

    /// Name of the per-directory ignore file.
    pub ignore_file: String,

    /// Regular expressions matched against file and directory names.
    pub exclude: Vec<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Also write the search dataset to `search_index.json`.
    pub search_json: bool,

    /// Directory holding an `index.html` template override.
    pub templates_dir: Option<PathBuf>,

    /// Directory of extra static assets copied into `static/`.
    pub static_dir: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Keyword Documentation".to_string(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            module: "robot.libdoc".to_string(),
            min_python: "3.8".to_string(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            builtin: STANDARD_LIBRARIES.iter().map(ToString::to_string).collect(),
            discover: true,
            framework: "robotframework".to_string(),
            exclude_prefix: "rfhub".to_string(),
            site_packages: Vec::new(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["resource", "txt", "py", "robot"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            ignore_file: ".rfhubignore".to_string(),
            exclude: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            search_json: true,
            templates_dir: None,
            static_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file layered with
    /// `RFHUB__SECTION__KEY` environment variables.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                return Err(CoreError::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("RFHUB")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.generator.python.trim().is_empty() {
            return Err(CoreError::config("generator.python cannot be empty"));
        }

        if self.generator.module.trim().is_empty() {
            return Err(CoreError::config("generator.module cannot be empty"));
        }

        if self.min_python_version().is_none() {
            return Err(CoreError::config(format!(
                "generator.min_python must look like 3.8, got '{}'",
                self.generator.min_python
            )));
        }

        if self.scan.extensions.is_empty() {
            return Err(CoreError::config("scan.extensions cannot be empty"));
        }

        for pattern in &self.scan.exclude {
            Regex::new(pattern).map_err(|e| {
                CoreError::config_with_source(
                    format!("invalid scan.exclude pattern '{pattern}'"),
                    e,
                )
            })?;
        }

        if self.scan.extensions.iter().any(|ext| ext.starts_with('.')) {
            tracing::warn!("scan.extensions should not include the leading dot");
        }

        Ok(())
    }

    /// Minimum interpreter version as `(major, minor)`.
    #[must_use]
    pub fn min_python_version(&self) -> Option<(u32, u32)> {
        let (major, minor) = self.generator.min_python.trim().split_once('.')?;
        Some((major.parse().ok()?, minor.parse().ok()?))
    }
}
