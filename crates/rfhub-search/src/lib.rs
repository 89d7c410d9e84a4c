//! rfhub-static Search Library
//!
//! Builds the flattened keyword dataset that powers client-side search on the
//! index page. The dataset is inlined into the page and can also be written
//! out as a standalone JSON file.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use rfhub_search::SearchIndex;
//!
//! let index = SearchIndex::from_records(std::iter::empty());
//! index.write_to_file(Path::new("search_index.json")).unwrap();
//! ```

pub mod index;

pub use index::{MAX_INLINE_INDEX_SIZE, SearchIndex, SearchIndexEntry};
use thiserror::Error;

/// Search-related errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
