//! rfhub-static Generator Library
//!
//! Documentation pipeline for the keyword documentation site.
//!
//! # Modules
//!
//! - [`scanner`] - Resource file discovery with name-based exclusions
//! - [`discovery`] - Installed library package discovery
//! - [`libdoc`] - External documentation generator backend
//! - [`docgen`] - Per-library documentation pages and records
//! - [`tree`] - Folder hierarchy of documented resources
//! - [`template`] - HTML template system with variable interpolation
//! - [`html`] - Index page and search dataset
//! - [`assets`] - Static asset installation
//! - [`build`] - Build orchestration

pub mod assets;
pub mod build;
pub mod discovery;
pub mod docgen;
pub mod html;
pub mod libdoc;
pub mod scanner;
pub mod template;
pub mod tree;

pub use assets::AssetProcessor;
pub use build::{BuildError, BuildReporter, BuildStats, Builder, SilentReporter};
pub use discovery::ModuleDiscovery;
pub use docgen::DocGenerator;
pub use html::{CategoryDocs, IndexRenderer};
pub use libdoc::{DocBackend, LibdocCommand};
pub use scanner::PathScanner;
pub use template::{Template, TemplateContext, TemplateRegistry};
pub use tree::ResourceTree;
