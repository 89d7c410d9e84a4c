//! Per-library documentation generation.
//!
//! Wraps one [`DocBackend`] instance and turns a library identifier or resource
//! path into a [`DocRecord`], or nothing when the item is not documentable.

use std::{
    fs,
    path::{Path, PathBuf},
};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rfhub_core::{DocRecord, KeywordEntry, doc::base_name};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::libdoc::{DocBackend, LibdocError};

/// Bytes left as-is in URLs: alphanumerics plus `_ . - ~ /`.
pub const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Documentation generation errors. Items that simply cannot be documented
/// are not errors.
#[derive(Debug, Error)]
pub enum DocGenError {
    /// The generator could not be invoked.
    #[error("generator error: {0}")]
    Libdoc(#[from] LibdocError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output file outside the output directory.
    #[error("output file {0} is not inside the output directory")]
    OutsideOutput(PathBuf),
}

/// Result type for documentation generation.
pub type Result<T> = std::result::Result<T, DocGenError>;

/// Generates doc pages below one output directory.
pub struct DocGenerator<'a, B: DocBackend + ?Sized> {
    backend: &'a B,
    out_dir: PathBuf,
}

impl<'a, B: DocBackend + ?Sized> DocGenerator<'a, B> {
    /// Create a generator writing below `out_dir`.
    pub fn new(backend: &'a B, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            out_dir: out_dir.into(),
        }
    }

    /// Output root.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Document `source` into `out_file` under the logical `name`.
    ///
    /// Returns `Ok(None)` when the generator rejects the source, lists no
    /// keywords, or fails to render. A failed render never leaves its output
    /// file behind, and a page left over from earlier is never taken for the
    /// result of this render.
    pub fn generate(&self, source: &str, out_file: &Path, name: &str) -> Result<Option<DocRecord>> {
        let Some(keywords) = self.backend.list_keywords(source)? else {
            debug!(source, "not a documentable library");
            return Ok(None);
        };
        if keywords.is_empty() {
            debug!(source, "no keywords listed, skipping");
            return Ok(None);
        }

        if let Some(parent) = out_file.parent() {
            fs::create_dir_all(parent)?;
        }
        if out_file.exists() {
            debug!(path = %out_file.display(), "removing stale doc page before rendering");
            fs::remove_file(out_file)?;
        }

        let rendered = self.backend.render(source, out_file, base_name(name))?;
        if !rendered && out_file.exists() {
            warn!(source, path = %out_file.display(), "render failed, removing partial output");
            fs::remove_file(out_file)?;
        }
        if !out_file.is_file() {
            return Ok(None);
        }

        let relative = out_file
            .strip_prefix(&self.out_dir)
            .map_err(|_| DocGenError::OutsideOutput(out_file.to_path_buf()))?;
        let url = doc_url(relative);

        let mut keywords = keywords;
        keywords.sort();
        let keywords: Vec<_> = keywords
            .into_iter()
            .map(|kw| KeywordEntry {
                url: keyword_url(&url, &kw),
                name: kw,
            })
            .collect();

        info!(library = name, keywords = keywords.len(), "created documentation");

        Ok(Some(DocRecord {
            name: name.to_string(),
            keywords,
            source_path: source.to_string(),
            url,
        }))
    }
}

/// Percent-encode a string with [`URL_ENCODE_SET`].
#[must_use]
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, URL_ENCODE_SET).to_string()
}

/// URL of a doc page from its path relative to the output root. Always uses
/// forward slashes.
#[must_use]
pub fn doc_url(relative: &Path) -> String {
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    encode(&joined)
}

/// URL of a keyword section within a doc page.
#[must_use]
pub fn keyword_url(doc_url: &str, keyword: &str) -> String {
    format!("{doc_url}#{}", encode(keyword))
}

/// Output file for a library.
#[must_use]
pub fn library_out_file(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{name}.html"))
}

/// Output file for a resource at `relative` inside a category directory.
#[must_use]
pub fn resource_out_file(out_dir: &Path, category: &str, relative: &Path) -> PathBuf {
    out_dir.join(category).join(relative.with_extension("html"))
}
