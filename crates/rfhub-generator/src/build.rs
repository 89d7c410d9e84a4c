//! Build orchestration.
//!
//! Coordinates the full documentation site build: validation, output reset,
//! assets, library and resource documentation, and the index page.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Component, Path, PathBuf},
    time::Instant,
};

use rfhub_core::{Category, Config, DocRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::{AssetError, AssetProcessor},
    discovery::ModuleDiscovery,
    docgen::{self, DocGenError, DocGenerator},
    html::{CategoryDocs, IndexError, IndexRenderer},
    libdoc::{DocBackend, LibdocError},
    scanner::{PathScanner, ScanError},
    template::{TemplateError, TemplateRegistry},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input path does not exist or is not a directory.
    #[error("input path '{0}' not found or is not a directory")]
    InvalidInput(PathBuf),

    /// The output path is a filesystem root.
    #[error("output path '{0}' is a filesystem root")]
    OutputIsRoot(PathBuf),

    /// Resetting the output path would delete an input directory.
    #[error("output path '{output}' contains input path '{input}'")]
    OutputContainsInput { output: PathBuf, input: PathBuf },

    /// Scanner error.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Documentation generator error.
    #[error("generator error: {0}")]
    Libdoc(#[from] LibdocError),

    /// Documentation generation error.
    #[error("documentation error: {0}")]
    DocGen(#[from] DocGenError),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Index rendering error.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of libraries documented.
    pub libraries: usize,

    /// Documented files per category key, in input order.
    pub resources: Vec<(String, usize)>,

    /// Total keywords in the search dataset.
    pub keywords: usize,

    /// Libraries and files the generator could not document.
    pub skipped: usize,

    /// Number of static assets installed.
    pub assets: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Receives progress notifications during a build.
pub trait BuildReporter {
    /// A group of items is about to be documented.
    fn phase(&self, name: &str, count: usize);

    /// One library or resource was documented.
    fn documented(&self, record: &DocRecord);

    /// The build finished.
    fn done(&self, stats: &BuildStats);
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BuildReporter for SilentReporter {
    fn phase(&self, _name: &str, _count: usize) {}
    fn documented(&self, _record: &DocRecord) {}
    fn done(&self, _stats: &BuildStats) {}
}

/// Resource input directory for one category.
#[derive(Debug, Clone)]
struct CategoryInput {
    category: Category,
    dir: PathBuf,
}

/// Documentation site builder.
#[derive(Debug)]
pub struct Builder<B: DocBackend> {
    config: Config,
    backend: B,
    output_dir: PathBuf,
    inputs: Vec<CategoryInput>,
    version: String,
}

impl<B: DocBackend> Builder<B> {
    /// Create a new builder.
    #[must_use]
    pub fn new(config: Config, backend: B, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            backend,
            output_dir: output_dir.into(),
            inputs: Vec::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Add a resource input directory documented under `category`.
    #[must_use]
    pub fn with_input(mut self, category: Category, dir: impl Into<PathBuf>) -> Self {
        self.inputs.push(CategoryInput {
            category,
            dir: dir.into(),
        });
        self
    }

    /// Set the version shown on the index page.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check input and output paths without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        for input in &self.inputs {
            if !input.dir.is_dir() {
                return Err(BuildError::InvalidInput(input.dir.clone()));
            }
        }

        let output = resolve_path(&self.output_dir)?;
        if output.parent().is_none() {
            return Err(BuildError::OutputIsRoot(self.output_dir.clone()));
        }

        for input in &self.inputs {
            if resolve_path(&input.dir)?.starts_with(&output) {
                return Err(BuildError::OutputContainsInput {
                    output: self.output_dir.clone(),
                    input: input.dir.clone(),
                });
            }
        }

        Ok(())
    }

    /// Execute the full build process.
    pub fn build(&self, reporter: &dyn BuildReporter) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(
            output = %self.output_dir.display(),
            inputs = self.inputs.len(),
            "starting build"
        );

        // Everything that can fail up front does so before the output is wiped.
        self.validate()?;
        let templates = match self.config.output.templates_dir {
            Some(ref dir) => TemplateRegistry::from_dir(dir)?,
            None => TemplateRegistry::new(),
        };
        let scanner = PathScanner::from_config(&self.config)?;

        self.clean_output()?;

        let mut assets = AssetProcessor::new();
        if let Some(ref dir) = self.config.output.static_dir {
            assets = assets.with_extra_dir(dir);
        }
        stats.assets = assets.process(&self.output_dir)?;

        let generator = DocGenerator::new(&self.backend, &self.output_dir);

        let libraries = self.generate_libraries(&generator, reporter, &mut stats)?;
        stats.libraries = libraries.len();

        let mut categories = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let records =
                self.generate_category(&generator, &scanner, input, reporter, &mut stats)?;
            stats
                .resources
                .push((input.category.key.clone(), records.len()));
            categories.push((&input.category, records));
        }

        let category_docs: Vec<_> = categories
            .iter()
            .map(|(category, records)| CategoryDocs {
                category,
                records: records.as_slice(),
            })
            .collect();

        let renderer =
            IndexRenderer::with_templates(templates, &self.config.site.title, &self.version);
        let rendered = renderer.write(
            &self.output_dir,
            &libraries,
            &category_docs,
            self.config.output.search_json,
        )?;
        stats.keywords = rendered.search.len();

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            libraries = stats.libraries,
            keywords = stats.keywords,
            skipped = stats.skipped,
            assets = stats.assets,
            duration_ms = stats.duration_ms,
            "build complete"
        );
        reporter.done(&stats);

        Ok(stats)
    }

    /// Remove and recreate the output directory.
    fn clean_output(&self) -> Result<()> {
        if self.output_dir.exists() {
            debug!(dir = %self.output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Document built-in and installed libraries, sorted by name.
    ///
    /// Installed libraries are merged after built-ins and replace a built-in
    /// of the same name.
    fn generate_libraries(
        &self,
        generator: &DocGenerator<'_, B>,
        reporter: &dyn BuildReporter,
        stats: &mut BuildStats,
    ) -> Result<Vec<DocRecord>> {
        let mut libraries = BTreeMap::new();

        let mut builtin = self.config.libraries.builtin.clone();
        builtin.sort();
        builtin.dedup();
        reporter.phase("Built-in Libraries", builtin.len());
        self.document_libraries(generator, &builtin, &mut libraries, reporter, stats)?;

        if self.config.libraries.discover {
            let dirs = if self.config.libraries.site_packages.is_empty() {
                self.backend.package_dirs()?
            } else {
                self.config.libraries.site_packages.clone()
            };
            debug!(?dirs, "package directories");

            let installed = ModuleDiscovery::from_config(&self.config).discover(&dirs);
            reporter.phase("Installed Libraries", installed.len());
            self.document_libraries(generator, &installed, &mut libraries, reporter, stats)?;
        }

        Ok(libraries.into_values().collect())
    }

    fn document_libraries(
        &self,
        generator: &DocGenerator<'_, B>,
        names: &[String],
        libraries: &mut BTreeMap<String, DocRecord>,
        reporter: &dyn BuildReporter,
        stats: &mut BuildStats,
    ) -> Result<()> {
        for name in names {
            // A record never outlives its page, which is regenerated below.
            if libraries.remove(name).is_some() {
                warn!(
                    library = %name,
                    "installed library replaces built-in of the same name"
                );
            }

            let out_file = docgen::library_out_file(&self.output_dir, name);
            match generator.generate(name, &out_file, name)? {
                Some(record) => {
                    reporter.documented(&record);
                    libraries.insert(name.clone(), record);
                }
                None => stats.skipped += 1,
            }
        }
        Ok(())
    }

    /// Document every file found in one category's input directory, sorted by
    /// name.
    fn generate_category(
        &self,
        generator: &DocGenerator<'_, B>,
        scanner: &PathScanner,
        input: &CategoryInput,
        reporter: &dyn BuildReporter,
        stats: &mut BuildStats,
    ) -> Result<Vec<DocRecord>> {
        let root = std::path::absolute(&input.dir)?;
        let files = scanner.scan(&root);
        reporter.phase(&input.category.title, files.len());

        let mut records = BTreeMap::new();
        let mut out_files = HashSet::new();

        for file in &files {
            let Ok(relative) = file.strip_prefix(&root) else {
                continue;
            };
            let name = logical_name(relative);
            let Some(source) = file.to_str() else {
                warn!(path = %file.display(), "skipping resource with a non UTF-8 path");
                stats.skipped += 1;
                continue;
            };

            let Some(out_file) =
                resource_page(&self.output_dir, &input.category.key, relative, &out_files)
            else {
                warn!(resource = %name, "no free doc page name, skipping");
                stats.skipped += 1;
                continue;
            };
            out_files.insert(out_file.clone());

            match generator.generate(source, &out_file, &name)? {
                Some(record) => {
                    reporter.documented(&record);
                    records.insert(name, record);
                }
                None => stats.skipped += 1,
            }
        }

        Ok(records.into_values().collect())
    }
}

/// Doc page for a resource. When the usual page is already taken by a sibling
/// with the same stem, the source extension is kept in the page name instead.
fn resource_page(
    out_dir: &Path,
    category: &str,
    relative: &Path,
    taken: &HashSet<PathBuf>,
) -> Option<PathBuf> {
    let page = docgen::resource_out_file(out_dir, category, relative);
    if !taken.contains(&page) {
        return Some(page);
    }

    let mut keep_extension = relative.as_os_str().to_owned();
    keep_extension.push(".html");
    let page = out_dir.join(category).join(keep_extension);
    debug!(path = %page.display(), "doc page name collision, keeping source extension");
    (!taken.contains(&page)).then_some(page)
}

/// Absolute form of `path` with `.` and `..` resolved. The longest existing
/// prefix is canonicalized, the remainder is resolved lexically.
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let components: Vec<Component<'_>> = absolute.components().collect();

    let existing = (1..=components.len())
        .rev()
        .find(|&len| components[..len].iter().collect::<PathBuf>().exists())
        .unwrap_or(0);

    let mut resolved = if existing == 0 {
        PathBuf::new()
    } else {
        fs::canonicalize(components[..existing].iter().collect::<PathBuf>())?
    };
    for component in &components[existing..] {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }

    Ok(resolved)
}

/// `/`-separated logical name of a path relative to its input directory.
fn logical_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, collections::HashMap, path::Path};

    use tempfile::TempDir;

    use super::*;
    use crate::libdoc;

    struct MapBackend(HashMap<String, Vec<String>>);

    impl DocBackend for MapBackend {
        fn list_keywords(&self, source: &str) -> libdoc::Result<Option<Vec<String>>> {
            Ok(self.0.get(source).cloned())
        }

        fn render(&self, _source: &str, out_file: &Path, name: &str) -> libdoc::Result<bool> {
            fs::write(out_file, name).unwrap();
            Ok(true)
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.libraries.builtin = vec!["Collections".to_string(), "BuiltIn".to_string()];
        config.libraries.discover = false;
        config
    }

    fn backend() -> MapBackend {
        MapBackend(HashMap::from([
            ("BuiltIn".to_string(), vec!["Log".to_string()]),
            (
                "Collections".to_string(),
                vec!["Get From List".to_string(), "Append To List".to_string()],
            ),
        ]))
    }

    #[test]
    fn test_build_libraries_only() {
        let out = TempDir::new().unwrap();
        let site = out.path().join("site");

        let stats = Builder::new(test_config(), backend(), &site)
            .build(&SilentReporter)
            .unwrap();

        assert_eq!(stats.libraries, 2);
        assert_eq!(stats.keywords, 3);
        assert_eq!(stats.skipped, 0);
        assert!(site.join("BuiltIn.html").is_file());
        assert!(site.join("index.html").is_file());
        assert!(site.join("search_index.json").is_file());
        assert!(site.join("static/style.css").is_file());
    }

    #[test]
    fn test_build_stats_default() {
        let stats = BuildStats::default();
        assert_eq!(stats.libraries, 0);
        assert!(stats.resources.is_empty());
        assert_eq!(stats.duration_ms, 0);
    }

    #[test]
    fn test_invalid_input_rejected_before_output_touched() {
        let out = TempDir::new().unwrap();
        let site = out.path().join("site");
        fs::create_dir_all(&site).unwrap();
        fs::write(site.join("keep.txt"), "still here").unwrap();

        let result = Builder::new(test_config(), backend(), &site)
            .with_input(Category::resources(), out.path().join("missing"))
            .build(&SilentReporter);

        assert!(matches!(result, Err(BuildError::InvalidInput(_))));
        assert!(site.join("keep.txt").exists());
    }

    #[test]
    fn test_root_output_rejected() {
        let root = if cfg!(windows) { "C:\\" } else { "/" };
        let result = Builder::new(test_config(), backend(), root).validate();
        assert!(matches!(result, Err(BuildError::OutputIsRoot(_))));
    }

    #[test]
    fn test_root_reached_through_parent_components_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut output = tmp.path().to_path_buf();
        for _ in 0..tmp.path().components().count() + 2 {
            output.push("..");
        }

        let result = Builder::new(test_config(), backend(), &output).validate();
        assert!(matches!(result, Err(BuildError::OutputIsRoot(_))));
    }

    #[test]
    fn test_output_resolving_to_input_parent_rejected() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("resources");
        fs::create_dir_all(&input).unwrap();

        for output in [tmp.path().join("site").join(".."), input.join("..").join(".")] {
            let result = Builder::new(test_config(), backend(), &output)
                .with_input(Category::resources(), &input)
                .validate();
            assert!(
                matches!(result, Err(BuildError::OutputContainsInput { .. })),
                "{} accepted",
                output.display()
            );
        }
        assert!(input.is_dir());
    }

    #[test]
    fn test_resolve_path() {
        let tmp = TempDir::new().unwrap();
        let base = fs::canonicalize(tmp.path()).unwrap();

        assert_eq!(resolve_path(&tmp.path().join("a/../b/./c")).unwrap(), base.join("b/c"));
        assert_eq!(resolve_path(tmp.path()).unwrap(), base);
    }

    #[derive(Default)]
    struct SecondRenderFails(Cell<usize>);

    impl DocBackend for SecondRenderFails {
        fn list_keywords(&self, _source: &str) -> libdoc::Result<Option<Vec<String>>> {
            Ok(Some(vec!["Log".to_string()]))
        }

        fn render(&self, _source: &str, out_file: &Path, _name: &str) -> libdoc::Result<bool> {
            let calls = self.0.get() + 1;
            self.0.set(calls);
            fs::write(out_file, "partial").unwrap();
            Ok(calls == 1)
        }
    }

    #[test]
    fn test_failed_replacement_drops_earlier_library() {
        let out = TempDir::new().unwrap();
        let builder = Builder::new(test_config(), SecondRenderFails::default(), out.path());
        let generator = DocGenerator::new(builder.backend(), out.path());
        let names = vec!["BuiltIn".to_string()];
        let mut libraries = BTreeMap::new();
        let mut stats = BuildStats::default();

        builder
            .document_libraries(&generator, &names, &mut libraries, &SilentReporter, &mut stats)
            .unwrap();
        assert!(libraries.contains_key("BuiltIn"));
        assert!(out.path().join("BuiltIn.html").is_file());

        builder
            .document_libraries(&generator, &names, &mut libraries, &SilentReporter, &mut stats)
            .unwrap();
        assert!(libraries.is_empty());
        assert!(!out.path().join("BuiltIn.html").exists());
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_resource_page_keeps_extension_on_collision() {
        let out = Path::new("/site");
        let mut taken = HashSet::new();

        let first = resource_page(out, "resources", Path::new("lib/foo.resource"), &taken).unwrap();
        assert_eq!(first, Path::new("/site/resources/lib/foo.html"));
        taken.insert(first);

        let second = resource_page(out, "resources", Path::new("lib/foo.robot"), &taken).unwrap();
        assert_eq!(second, Path::new("/site/resources/lib/foo.robot.html"));
        taken.insert(second);

        assert!(resource_page(out, "resources", Path::new("lib/foo.robot"), &taken).is_none());
    }

    #[test]
    fn test_output_containing_input_rejected() {
        let out = TempDir::new().unwrap();
        let input = out.path().join("resources");
        fs::create_dir_all(&input).unwrap();

        let result = Builder::new(test_config(), backend(), out.path())
            .with_input(Category::resources(), &input)
            .validate();

        assert!(matches!(result, Err(BuildError::OutputContainsInput { .. })));
    }

    #[test]
    fn test_missing_template_dir_is_fatal() {
        let out = TempDir::new().unwrap();
        let mut config = test_config();
        config.output.templates_dir = Some(out.path().join("no-templates"));

        let result =
            Builder::new(config, backend(), out.path().join("site")).build(&SilentReporter);

        assert!(matches!(result, Err(BuildError::Template(_))));
        assert!(!out.path().join("site").exists());
    }

    #[test]
    fn test_logical_name() {
        let relative: PathBuf = ["lib", "sub", "foo.resource"].iter().collect();
        assert_eq!(logical_name(&relative), "lib/sub/foo.resource");
    }
}
