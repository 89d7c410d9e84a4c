//! Index page generation.
//!
//! Aggregates every documented library and resource into the search dataset
//! and renders the index page with a folder tree per resource category.

use std::{fs, path::Path};

use rfhub_core::{Category, DocRecord};
use rfhub_search::{SearchError, SearchIndex};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    template::{TemplateContext, TemplateError, TemplateRegistry, escape_html},
    tree::ResourceTree,
};

/// File name of the rendered index page.
pub const INDEX_FILE: &str = "index.html";

/// File name of the standalone search dataset.
pub const SEARCH_INDEX_FILE: &str = "search_index.json";

/// Index rendering errors.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Search dataset error.
    #[error("search dataset error: {0}")]
    Search(#[from] SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for index rendering.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Records documented for one resource category, sorted by name.
#[derive(Debug, Clone, Copy)]
pub struct CategoryDocs<'a> {
    /// The category.
    pub category: &'a Category,

    /// Its records.
    pub records: &'a [DocRecord],
}

/// Output of a render: the page and the dataset embedded in it.
#[derive(Debug, Clone)]
pub struct RenderedIndex {
    /// Complete index page.
    pub html: String,

    /// Search dataset embedded in the page.
    pub search: SearchIndex,
}

/// Renders the index page.
#[derive(Debug)]
pub struct IndexRenderer {
    templates: TemplateRegistry,
    title: String,
    version: String,
}

impl IndexRenderer {
    /// Create a renderer using the built-in template.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_templates(TemplateRegistry::new(), title, version)
    }

    /// Create a renderer with custom templates.
    #[must_use]
    pub fn with_templates(
        templates: TemplateRegistry,
        title: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            title: title.into(),
            version: version.into(),
        }
    }

    /// Render the index page. Libraries come first in the search dataset,
    /// followed by each category in order.
    pub fn render(
        &self,
        libraries: &[DocRecord],
        categories: &[CategoryDocs<'_>],
    ) -> Result<RenderedIndex> {
        let search = SearchIndex::from_records(
            libraries
                .iter()
                .chain(categories.iter().flat_map(|c| c.records.iter())),
        );

        let categories_html: String = categories
            .iter()
            .map(|docs| category_html(docs.category, &ResourceTree::build(docs.records)))
            .collect();

        let ctx = TemplateContext::new()
            .with_var("title", escape_html(&self.title))
            .with_var("version", escape_html(&self.version))
            .with_var("libraries_html", libraries_html(libraries))
            .with_var("categories_html", categories_html)
            .with_var("search_json", search.to_inline_json()?)
            .with_var("library_count", libraries.len().to_string())
            .with_var("keyword_count", search.len().to_string());

        let html = self.templates.render("index", &ctx)?;
        debug!(bytes = html.len(), "rendered index page");

        Ok(RenderedIndex { html, search })
    }

    /// Render the index page and write it, and optionally the standalone
    /// search dataset, into `out_dir`. Nothing is written if rendering fails.
    pub fn write(
        &self,
        out_dir: &Path,
        libraries: &[DocRecord],
        categories: &[CategoryDocs<'_>],
        search_json: bool,
    ) -> Result<RenderedIndex> {
        let rendered = self.render(libraries, categories)?;

        let index_path = out_dir.join(INDEX_FILE);
        fs::write(&index_path, &rendered.html)?;
        info!(path = %index_path.display(), "created index page");

        if search_json {
            rendered
                .search
                .write_to_file(&out_dir.join(SEARCH_INDEX_FILE))?;
        }

        Ok(rendered)
    }
}

/// Flat list of libraries with their keyword counts.
#[must_use]
pub fn libraries_html(libraries: &[DocRecord]) -> String {
    if libraries.is_empty() {
        return r#"<p class="empty">No libraries documented.</p>"#.to_string();
    }

    let items: String = libraries
        .iter()
        .map(|library| {
            format!(
                r#"<li class="library"><a href="{}">{}</a> <span class="count">({})</span></li>"#,
                escape_html(&library.url),
                escape_html(&library.name),
                library.keywords.len()
            )
        })
        .collect();

    format!(r#"<ul class="library-list">{items}</ul>"#)
}

/// Section for one resource category.
#[must_use]
pub fn category_html(category: &Category, tree: &ResourceTree<'_>) -> String {
    let body = if tree.is_empty() {
        format!(
            r#"<p class="empty">No {} documented.</p>"#,
            escape_html(&category.title.to_lowercase())
        )
    } else {
        tree_html(tree)
    };

    format!(
        r#"<section class="category" id="{}">
            <h2>{}</h2>
            {}
        </section>"#,
        escape_html(&category.key),
        escape_html(&category.title),
        body
    )
}

/// Nested list for a folder tree. Folders come before the files at the same
/// level.
#[must_use]
pub fn tree_html(tree: &ResourceTree<'_>) -> String {
    let folders: String = tree
        .dirs()
        .iter()
        .map(|(name, subtree)| {
            format!(
                r#"<li class="folder"><details open><summary>{}</summary>{}</details></li>"#,
                escape_html(name),
                tree_html(subtree)
            )
        })
        .collect();

    let files: String = tree
        .files()
        .iter()
        .map(|(name, record)| {
            format!(
                r#"<li class="file"><a href="{}" title="{}">{}</a> <span class="count">({})</span></li>"#,
                escape_html(&record.url),
                escape_html(&record.name),
                escape_html(name),
                record.keywords.len()
            )
        })
        .collect();

    format!(r#"<ul class="tree">{folders}{files}</ul>"#)
}

#[cfg(test)]
mod tests {
    use rfhub_core::KeywordEntry;
    use tempfile::TempDir;

    use super::*;

    fn record(name: &str, url: &str, keywords: &[&str]) -> DocRecord {
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
            url: url.to_string(),
        }
    }

    #[test]
    fn test_render_embeds_dataset_in_order() {
        let libraries = vec![record("BuiltIn", "BuiltIn.html", &["Log"])];
        let resources = vec![record(
            "lib/foo.resource",
            "resources/lib/foo.html",
            &["Do Thing", "Get Thing"],
        )];
        let category = Category::resources();
        let renderer = IndexRenderer::new("Docs", "1.2.3");

        let rendered = renderer
            .render(
                &libraries,
                &[CategoryDocs {
                    category: &category,
                    records: &resources,
                }],
            )
            .unwrap();

        let names: Vec<_> = rendered.search.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Log", "Do Thing", "Get Thing"]);
        assert!(rendered.html.contains(&rendered.search.to_inline_json().unwrap()));
        assert!(rendered.html.contains("<title>Docs</title>"));
        assert!(rendered.html.contains("1.2.3"));
        assert!(rendered.html.contains(r#"<summary>lib</summary>"#));
        assert!(rendered.html.contains(r#"href="resources/lib/foo.html""#));
        assert!(rendered.html.contains("1 libraries, 3 keywords"));
    }

    #[test]
    fn test_names_are_escaped() {
        let libraries = vec![record("<script>", "x.html", &["a"])];
        let html = libraries_html(&libraries);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_category_message() {
        let category = Category::page_objects();
        let html = category_html(&category, &ResourceTree::default());
        assert!(html.contains("No page objects documented."));
        assert!(html.contains(r#"id="page_objects""#));
    }

    #[test]
    fn test_tree_html_folders_before_files() {
        let records = vec![
            record("a/x.resource", "r/a/x.html", &[]),
            record("top.resource", "r/top.html", &[]),
        ];
        let html = tree_html(&ResourceTree::build(&records));

        let folder = html.find("<summary>a</summary>").unwrap();
        let file = html.find(">top.resource<").unwrap();
        assert!(folder < file);
    }

    #[test]
    fn test_missing_template_variable_is_fatal() {
        let mut templates = TemplateRegistry::default();
        templates.register(crate::template::Template::new("index", "{{ undefined }}"));
        let renderer = IndexRenderer::with_templates(templates, "Docs", "0");

        let dir = TempDir::new().unwrap();
        let result = renderer.write(dir.path(), &[], &[], true);

        assert!(matches!(result, Err(IndexError::Template(_))));
        assert!(!dir.path().join(INDEX_FILE).exists());
        assert!(!dir.path().join(SEARCH_INDEX_FILE).exists());
    }

    #[test]
    fn test_write_outputs() {
        let dir = TempDir::new().unwrap();
        let libraries = vec![record("XML", "XML.html", &["Parse XML"])];
        let renderer = IndexRenderer::new("Docs", "0.3.0");

        renderer.write(dir.path(), &libraries, &[], true).unwrap();

        assert!(dir.path().join(INDEX_FILE).is_file());
        let json = fs::read_to_string(dir.path().join(SEARCH_INDEX_FILE)).unwrap();
        assert!(json.contains(r#""library":"XML""#));
    }

    #[test]
    fn test_write_without_search_json() {
        let dir = TempDir::new().unwrap();
        let renderer = IndexRenderer::new("Docs", "0.3.0");

        renderer.write(dir.path(), &[], &[], false).unwrap();

        assert!(dir.path().join(INDEX_FILE).is_file());
        assert!(!dir.path().join(SEARCH_INDEX_FILE).exists());
    }
}
