//! Folder hierarchy of documented resources.

use rfhub_core::DocRecord;

/// Nested folder view over resource records whose names are `/`-separated
/// relative paths.
///
/// Each level holds its subfolders and the files that live directly in it.
/// Both keep input order, so callers pass records sorted by name for
/// deterministic output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResourceTree<'a> {
    dirs: Vec<(String, ResourceTree<'a>)>,
    files: Vec<(String, &'a DocRecord)>,
}

impl<'a> ResourceTree<'a> {
    /// Build a tree from a flat sequence of records.
    pub fn build(records: impl IntoIterator<Item = &'a DocRecord>) -> Self {
        let mut tree = Self::default();
        for record in records {
            tree.insert(record);
        }
        tree
    }

    /// Place one record at the path given by its name.
    pub fn insert(&mut self, record: &'a DocRecord) {
        let normalized = record.name.replace('\\', "/");
        let mut segments: Vec<&str> = normalized.split('/').collect();
        let file_name = segments.pop().unwrap_or_default().to_string();

        let mut level = self;
        for segment in segments {
            level = level.child_mut(segment);
        }
        level.files.push((file_name, record));
    }

    fn child_mut(&mut self, segment: &str) -> &mut Self {
        let index = match self.dirs.iter().position(|(name, _)| name == segment) {
            Some(index) => index,
            None => {
                self.dirs.push((segment.to_string(), Self::default()));
                self.dirs.len() - 1
            }
        };
        &mut self.dirs[index].1
    }

    /// Subfolders at this level.
    #[must_use]
    pub fn dirs(&self) -> &[(String, ResourceTree<'a>)] {
        &self.dirs
    }

    /// Files at this level as `(file name, record)`.
    #[must_use]
    pub fn files(&self) -> &[(String, &'a DocRecord)] {
        &self.files
    }

    /// Whether the tree holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.iter().all(|(_, dir)| dir.is_empty())
    }

    /// Total number of records in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.files.len() + self.dirs.iter().map(|(_, dir)| dir.leaf_count()).sum::<usize>()
    }

    /// Follow a `/`-separated name down the tree.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&'a DocRecord> {
        let normalized = name.replace('\\', "/");
        let mut segments: Vec<&str> = normalized.split('/').collect();
        let file_name = segments.pop()?;

        let mut level = self;
        for segment in segments {
            level = &level.dirs.iter().find(|(name, _)| name == segment)?.1;
        }
        level
            .files
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, record)| *record)
    }
}
