//! Documentation records produced for libraries and resources.

use serde::{Deserialize, Serialize};

/// A single keyword and the URL of its section in the doc page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    /// Keyword name as reported by the generator.
    pub name: String,

    /// Doc page URL with the keyword fragment appended.
    pub url: String,
}

/// Documentation generated for one library or resource file.
///
/// Only exists when the external generator succeeded and its output file is
/// on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRecord {
    /// Logical name. For resources this is the `/`-separated path relative
    /// to the scanned directory.
    pub name: String,

    /// Keywords sorted by name.
    pub keywords: Vec<KeywordEntry>,

    /// Identifier or file path handed to the generator.
    #[serde(rename = "path")]
    pub source_path: String,

    /// Percent-encoded URL of the doc page, relative to the output root.
    pub url: String,
}

impl DocRecord {
    /// Last segment of the logical name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// Last `/` or `\` separated segment of a logical name.
#[must_use]
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// A resource-like category of documented files, each fed from its own input
/// directory and written under its own output subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Output subdirectory and stable identifier.
    pub key: String,

    /// Heading shown on the index page.
    pub title: String,
}

impl Category {
    /// Create a category.
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }

    /// Shared resource files.
    #[must_use]
    pub fn resources() -> Self {
        Self::new("resources", "Resources")
    }

    /// Page object files.
    #[must_use]
    pub fn page_objects() -> Self {
        Self::new("page_objects", "Page Objects")
    }

    /// Category for the n-th positional input directory.
    #[must_use]
    pub fn for_position(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::resources()),
            1 => Some(Self::page_objects()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("lib/foo.resource"), "foo.resource");
        assert_eq!(base_name("lib\\win\\bar.robot"), "bar.robot");
        assert_eq!(base_name("Collections"), "Collections");
    }

    #[test]
    fn test_record_base_name() {
        let record = DocRecord {
            name: "lib/common/login.resource".to_string(),
            keywords: Vec::new(),
            source_path: "/repo/resources/lib/common/login.resource".to_string(),
            url: "resources/lib/common/login.html".to_string(),
        };

        assert_eq!(record.base_name(), "login.resource");
    }

    #[test]
    fn test_category_positions() {
        assert_eq!(Category::for_position(0), Some(Category::resources()));
        assert_eq!(
            Category::for_position(1).map(|c| c.key),
            Some("page_objects".to_string())
        );
        assert!(Category::for_position(2).is_none());
    }
}
