//! rfhub-static Core Library
//!
//! Core types, configuration, and error handling for the keyword documentation
//! site generator.

pub mod config;
pub mod doc;
pub mod error;

pub use config::Config;
pub use doc::{Category, DocRecord, KeywordEntry};
pub use error::{CoreError, Result};
