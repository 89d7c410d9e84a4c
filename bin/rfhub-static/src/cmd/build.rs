//! Build command - generates the documentation site

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, eyre};
use rfhub_core::{Category, Config, DocRecord};
use rfhub_generator::{BuildReporter, BuildStats, Builder, LibdocCommand};

/// Options collected from the command line.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions<'a> {
    /// Optional configuration file.
    pub config_path: Option<&'a Path>,

    /// Output directory, recreated on every run.
    pub output: &'a Path,

    /// Resource input directories, by category position.
    pub inputs: &'a [PathBuf],

    /// Interpreter override.
    pub python: Option<&'a str>,

    /// Skip built-in and installed libraries.
    pub no_libraries: bool,
}

/// Prints progress to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl BuildReporter for ConsoleReporter {
    fn phase(&self, name: &str, count: usize) {
        println!();
        println!("  {}", phase_line(name, count));
    }

    fn documented(&self, record: &DocRecord) {
        println!("    {}", documented_line(record));
    }

    fn done(&self, stats: &BuildStats) {
        println!();
        println!("  Build completed successfully!");
        println!();
        println!("  Libraries:  {}", stats.libraries);
        for (category, count) in &stats.resources {
            println!("  {:<11} {count}", format!("{category}:"));
        }
        println!("  Keywords:   {}", stats.keywords);
        println!("  Skipped:    {}", stats.skipped);
        println!("  Assets:     {}", stats.assets);
        println!();
        println!("  Duration:   {:.2}s", stats.duration_ms as f64 / 1000.0);
    }
}

fn phase_line(name: &str, count: usize) -> String {
    format!("{name} ({count} found)")
}

fn documented_line(record: &DocRecord) -> String {
    format!("{} ({} keywords)", record.name, record.keywords.len())
}

/// Run the build command.
pub fn run(options: &BuildOptions<'_>) -> Result<BuildStats> {
    tracing::info!(
        config_path = ?options.config_path,
        output = ?options.output,
        inputs = ?options.inputs,
        "Starting build"
    );

    let config = load_config(options)?;
    tracing::debug!(?config, "Loaded configuration");

    let backend = LibdocCommand::from_config(&config);
    let mut builder = Builder::new(config, backend, options.output);
    for (position, input) in options.inputs.iter().enumerate() {
        let category = Category::for_position(position)
            .ok_or_else(|| eyre!("too many input directories: {}", options.inputs.len()))?;
        builder = builder.with_input(category, input);
    }

    builder.validate().wrap_err("Invalid arguments")?;

    let (major, minor) = builder
        .backend()
        .check_runtime()
        .wrap_err("Unsupported runtime")?;
    tracing::info!(major, minor, "Runtime version accepted");

    let stats = builder.build(&ConsoleReporter).wrap_err("Build failed")?;

    println!("  Output:     {}", options.output.display());
    println!();

    tracing::info!(?stats, "Build completed successfully");

    Ok(stats)
}

/// Load configuration and apply command-line overrides.
fn load_config(options: &BuildOptions<'_>) -> Result<Config> {
    let mut config =
        Config::load_with_env(options.config_path).wrap_err("Failed to load configuration")?;

    if let Some(python) = options.python {
        tracing::info!(python, "Overriding interpreter from CLI");
        config.generator.python = python.to_string();
    }

    if options.no_libraries {
        config.libraries.builtin.clear();
        config.libraries.discover = false;
    }

    config.validate().wrap_err("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rfhub_core::KeywordEntry;
    use tempfile::TempDir;

    use super::*;

    fn options<'a>(output: &'a Path, inputs: &'a [PathBuf]) -> BuildOptions<'a> {
        BuildOptions {
            config_path: None,
            output,
            inputs,
            python: None,
            no_libraries: false,
        }
    }

    #[test]
    fn test_missing_input_fails_before_output_touched() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("site");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("keep.html"), "x").unwrap();
        let inputs = vec![tmp.path().join("missing")];

        let err = run(&options(&output, &inputs)).unwrap_err();

        assert!(format!("{err:?}").contains("missing"));
        assert!(output.join("keep.html").exists());
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("nope.toml");
        let inputs = vec![tmp.path().to_path_buf()];
        let mut opts = options(tmp.path(), &inputs);
        opts.config_path = Some(&config_path);

        let err = run(&opts).unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }

    #[test]
    fn test_overrides_applied() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![tmp.path().to_path_buf()];
        let mut opts = options(tmp.path(), &inputs);
        opts.python = Some("/opt/python3.12/bin/python3");
        opts.no_libraries = true;

        let config = load_config(&opts).unwrap();

        assert_eq!(config.generator.python, "/opt/python3.12/bin/python3");
        assert!(config.libraries.builtin.is_empty());
        assert!(!config.libraries.discover);
    }

    #[test]
    fn test_empty_python_override_rejected() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![tmp.path().to_path_buf()];
        let mut opts = options(tmp.path(), &inputs);
        opts.python = Some("");

        assert!(load_config(&opts).is_err());
    }

    #[test]
    fn test_progress_lines() {
        let record = DocRecord {
            name: "lib/foo.resource".to_string(),
            keywords: vec![KeywordEntry {
                name: "Do Thing".to_string(),
                url: "resources/lib/foo.html#Do%20Thing".to_string(),
            }],
            source_path: "/in/lib/foo.resource".to_string(),
            url: "resources/lib/foo.html".to_string(),
        };

        assert_eq!(documented_line(&record), "lib/foo.resource (1 keywords)");
        assert_eq!(phase_line("Resources", 3), "Resources (3 found)");
    }
}
