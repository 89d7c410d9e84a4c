//! rfhub-static CLI Library
//!
//! Command implementations for the `rfhub-static` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations
//!
//! # Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//!
//! use rfhub_static::cmd::build::{self, BuildOptions};
//!
//! let inputs = vec![PathBuf::from("resources")];
//! build::run(&BuildOptions {
//!     config_path: None,
//!     output: Path::new("site"),
//!     inputs: &inputs,
//!     python: None,
//!     no_libraries: false,
//! })
//! .unwrap();
//! ```

pub mod cmd;

pub use rfhub_core::Config;
pub use rfhub_generator::{BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
