//! Installed library discovery.
//!
//! Inspects installed package metadata (`*.dist-info` and legacy `*.egg-info`
//! directories) for packages built on top of the test framework and collects
//! the importable top-level names they contribute. Discovery is best-effort:
//! unreadable metadata just excludes the package.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use rfhub_core::Config;
use tracing::{debug, info};

/// Metadata gathered for one installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Distribution name as declared.
    pub name: String,

    /// Raw requirement specifiers.
    pub requires: Vec<String>,

    /// Installed file paths relative to the package directory.
    pub files: Vec<String>,

    /// Names listed in `top_level.txt`.
    pub top_level: Vec<String>,
}

impl PackageMetadata {
    /// Read a `*.dist-info` directory.
    pub fn from_dist_info(dir: &Path) -> Option<Self> {
        let metadata = fs::read_to_string(dir.join("METADATA")).ok()?;
        let (name, requires) = parse_metadata_headers(&metadata);

        let files = fs::read_to_string(dir.join("RECORD"))
            .map(|record| record.lines().filter_map(record_path).collect())
            .unwrap_or_default();

        Some(Self {
            name: name?,
            requires,
            files,
            top_level: read_lines(&dir.join("top_level.txt")),
        })
    }

    /// Read a legacy `*.egg-info` directory.
    pub fn from_egg_info(dir: &Path) -> Option<Self> {
        let pkg_info = fs::read_to_string(dir.join("PKG-INFO")).ok()?;
        let (name, _) = parse_metadata_headers(&pkg_info);

        let requires = read_lines(&dir.join("requires.txt"))
            .into_iter()
            .filter(|line| !line.starts_with('['))
            .collect();

        Some(Self {
            name: name?,
            requires,
            files: Vec::new(),
            top_level: read_lines(&dir.join("top_level.txt")),
        })
    }

    /// Importable top-level names contributed by this package.
    #[must_use]
    pub fn top_level_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .files
            .iter()
            .filter_map(|file| top_level_of(file))
            .collect();

        if names.is_empty() {
            names.extend(self.top_level.iter().cloned());
        }
        names
    }
}

/// Finds installed packages that are libraries for the test framework.
#[derive(Debug, Clone)]
pub struct ModuleDiscovery {
    framework: String,
    exclude_prefix: String,
}

impl ModuleDiscovery {
    /// Create a discovery for packages depending on `framework`.
    #[must_use]
    pub fn new(framework: impl Into<String>, exclude_prefix: impl Into<String>) -> Self {
        Self {
            framework: normalize_name(&framework.into()),
            exclude_prefix: exclude_prefix.into(),
        }
    }

    /// Create a discovery from the `[libraries]` configuration section.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.libraries.framework, &config.libraries.exclude_prefix)
    }

    /// Sorted, deduplicated importable names of framework libraries installed
    /// in any of `package_dirs`.
    pub fn discover(&self, package_dirs: &[PathBuf]) -> Vec<String> {
        let mut names = BTreeSet::new();

        for dir in package_dirs {
            for package in read_packages(dir) {
                if !self.is_framework_library(&package) {
                    continue;
                }

                let contributed = package.top_level_names();
                debug!(package = %package.name, names = ?contributed, "found library package");
                names.extend(
                    contributed
                        .into_iter()
                        .filter(|name| !self.is_excluded(name)),
                );
            }
        }

        info!(count = names.len(), "discovered installed libraries");
        names.into_iter().collect()
    }

    fn is_excluded(&self, name: &str) -> bool {
        !self.exclude_prefix.is_empty() && name.starts_with(&self.exclude_prefix)
    }

    /// Whether a package declares the framework as a dependency, or is named
    /// as one of its extensions.
    #[must_use]
    pub fn is_framework_library(&self, package: &PackageMetadata) -> bool {
        let own_name = normalize_name(&package.name);
        if own_name == self.framework {
            return false;
        }

        let extension_prefix = format!("{}-", self.framework);
        if own_name.starts_with(&extension_prefix) {
            return true;
        }

        package.requires.iter().any(|req| {
            let dep = requirement_name(req);
            dep == self.framework || dep.starts_with(&extension_prefix)
        })
    }
}

/// Read metadata for every package installed directly in `dir`.
fn read_packages(dir: &Path) -> Vec<PackageMetadata> {
    let Ok(entries) = fs::read_dir(dir) else {
        debug!(dir = %dir.display(), "package directory not readable");
        return Vec::new();
    };

    let mut meta_dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    meta_dirs.sort();

    meta_dirs
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy();
            if name.ends_with(".dist-info") {
                PackageMetadata::from_dist_info(path)
            } else if name.ends_with(".egg-info") {
                PackageMetadata::from_egg_info(path)
            } else {
                None
            }
        })
        .collect()
}

/// Extract `Name` and `Requires-Dist` from core metadata headers.
fn parse_metadata_headers(content: &str) -> (Option<String>, Vec<String>) {
    let mut name = None;
    let mut requires = Vec::new();

    // Headers end at the first blank line; the long description follows.
    for line in content.lines().take_while(|line| !line.trim().is_empty()) {
        if let Some(value) = line.strip_prefix("Name:") {
            name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Requires-Dist:") {
            requires.push(value.trim().to_string());
        }
    }

    (name, requires)
}

/// Path field of a `RECORD` CSV line.
fn record_path(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('"') {
        let mut path = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    path.push('"');
                } else {
                    return Some(path);
                }
            } else {
                path.push(c);
            }
        }
        None
    } else {
        line.split(',').next().map(ToString::to_string)
    }
}

/// Importable top-level name of an installed Python source file.
fn top_level_of(file: &str) -> Option<String> {
    let file = file.replace('\\', "/");
    if !file.ends_with(".py") {
        return None;
    }

    let mut parts = file.split('/');
    let first = parts.next()?;
    let is_module_file = parts.next().is_none();

    if first.is_empty()
        || first.starts_with("..")
        || first == "__pycache__"
        || first.ends_with(".dist-info")
        || first.ends_with(".data")
    {
        return None;
    }

    if is_module_file {
        first.strip_suffix(".py").map(ToString::to_string)
    } else {
        Some(first.to_string())
    }
}

/// Distribution name at the start of a requirement specifier, normalized.
fn requirement_name(requirement: &str) -> String {
    let name: String = requirement
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    normalize_name(&name)
}

/// Normalize a distribution name: lowercase, runs of `-_.` become `-`.
fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_was_sep {
                normalized.push('-');
            }
            last_was_sep = true;
        } else {
            normalized.push(c.to_ascii_lowercase());
            last_was_sep = false;
        }
    }
    normalized
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| {
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
