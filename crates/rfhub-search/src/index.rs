//! Flattened keyword search dataset.
//!
//! One entry per keyword across every documented library and resource. The
//! browser loads the whole dataset at once, so there is no inverted index.

use std::{fs, path::Path};

use rfhub_core::DocRecord;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Result;

/// Size above which inlining the dataset starts to hurt page load (2MB).
pub const MAX_INLINE_INDEX_SIZE: usize = 2 * 1024 * 1024;

/// A keyword as seen by the search box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndexEntry {
    /// Keyword name.
    pub name: String,

    /// Doc page URL including the keyword fragment.
    pub url: String,

    /// Logical name of the library or resource defining the keyword.
    pub library: String,
}

/// The complete search dataset. Built once per run and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchIndex {
    entries: Vec<SearchIndexEntry>,
}

impl SearchIndex {
    /// Build the dataset, visiting records and their keywords in the order
    /// given.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DocRecord>) -> Self {
        let entries: Vec<_> = records
            .into_iter()
            .flat_map(|record| {
                record.keywords.iter().map(|kw| SearchIndexEntry {
                    name: kw.name.clone(),
                    url: kw.url.clone(),
                    library: record.name.clone(),
                })
            })
            .collect();

        info!(entries = entries.len(), "built search dataset");
        Self { entries }
    }

    /// All entries in visiting order.
    #[must_use]
    pub fn entries(&self) -> &[SearchIndexEntry] {
        &self.entries
    }

    /// Number of keywords indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dataset holds no keywords.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the dataset to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize the dataset for embedding inside a `<script>` element.
    ///
    /// `</` is escaped so keyword names can never close the element early.
    pub fn to_inline_json(&self) -> Result<String> {
        let json = self.to_json()?;
        if json.len() > MAX_INLINE_INDEX_SIZE {
            warn!(
                size = json.len(),
                max = MAX_INLINE_INDEX_SIZE,
                "inline search dataset exceeds recommended size"
            );
        }
        Ok(json.replace("</", "<\\/"))
    }

    /// Deserialize a dataset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the dataset to a standalone JSON file.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "wrote search dataset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rfhub_core::KeywordEntry;
    use tempfile::TempDir;

    use super::*;

    fn record(name: &str, keywords: &[&str]) -> DocRecord {
        let url = format!("{name}.html");
        DocRecord {
            name: name.to_string(),
            keywords: keywords
                .iter()
                .map(|kw| KeywordEntry {
                    name: (*kw).to_string(),
                    url: format!("{url}#{}", kw.replace(' ', "%20")),
                })
                .collect(),
            source_path: name.to_string(),
            url,
        }
    }

    #[test]
    fn test_flattens_in_visiting_order() {
        let libraries = vec![record("BuiltIn", &["Log", "Should Be Equal"])];
        let resources = vec![record("lib/foo.resource", &["Do Thing"])];

        let index = SearchIndex::from_records(libraries.iter().chain(resources.iter()));

        let names: Vec<_> = index.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Log", "Should Be Equal", "Do Thing"]);
        assert_eq!(index.entries()[2].library, "lib/foo.resource");
        assert_eq!(index.entries()[1].url, "BuiltIn.html#Should%20Be%20Equal");
    }

    #[test]
    fn test_json_is_plain_array() {
        let records = vec![record("XML", &["Parse XML"])];
        let index = SearchIndex::from_records(&records);

        let json = index.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"name":"Parse XML","url":"XML.html#Parse%20XML","library":"XML"}]"#
        );
        assert_eq!(SearchIndex::from_json(&json).unwrap(), index);
    }

    #[test]
    fn test_inline_json_escapes_script_close() {
        let records = vec![record("Evil", &["</script><b>"])];
        let index = SearchIndex::from_records(&records);

        let inline = index.to_inline_json().unwrap();
        assert!(!inline.contains("</script>"));
        assert!(inline.contains(r"<\/script>"));
    }

    #[test]
    fn test_empty_index() {
        let index = SearchIndex::from_records(std::iter::empty());
        assert!(index.is_empty());
        assert_eq!(index.to_json().unwrap(), "[]");
    }

    #[test]
    fn test_write_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search_index.json");
        let records = vec![record("Process", &["Run Process", "Start Process"])];

        SearchIndex::from_records(&records)
            .write_to_file(&path)
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let parsed = SearchIndex::from_json(&written).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
