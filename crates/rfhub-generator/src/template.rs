//! HTML template system for the index page.
//!
//! Provides a lightweight template system using string interpolation rather than
//! heavy template engines like Tera or Handlebars.

use std::{collections::HashMap, fs, path::Path};

use thiserror::Error;
use tracing::debug;

/// File name of the index template inside a templates directory.
pub const INDEX_TEMPLATE_FILE: &str = "index.html";

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),

    /// Template file could not be read.
    #[error("cannot read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template context with variables for interpolation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Create context with initial variables.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A simple template that supports variable interpolation.
///
/// Variables are specified as `{{ variable_name }}` in the template string;
/// `{{ variable_name? }}` renders as empty when the variable is absent.
/// Values are inserted verbatim, so callers escape them.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Render the template with the given context.
    ///
    /// Text is copied through in one forward pass, so braces inside an
    /// inserted value are never expanded.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut output = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some((text, after_open)) = rest.split_once("{{") {
            output.push_str(text);
            let (placeholder, after_close) = after_open.split_once("}}").ok_or_else(|| {
                TemplateError::InvalidSyntax(format!("unclosed {{{{ in template '{}'", self.name))
            })?;
            output.push_str(lookup(context, placeholder)?);
            rest = after_close;
        }
        output.push_str(rest);

        Ok(output)
    }
}

/// Value for one placeholder body. A trailing `?` makes the variable optional.
fn lookup<'a>(context: &'a TemplateContext, placeholder: &str) -> Result<&'a str> {
    let key = placeholder.trim();
    match key.strip_suffix('?') {
        Some(optional) => Ok(context.get(optional.trim()).unwrap_or_default()),
        None => context
            .get(key)
            .ok_or_else(|| TemplateError::MissingVariable(key.to_string())),
    }
}

/// Registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in index template.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register(Template::new("index", DEFAULT_INDEX_TEMPLATE));
        registry
    }

    /// Create a registry whose index template is read from `dir`.
    ///
    /// A configured directory without an index template is an error.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_TEMPLATE_FILE);
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded index template");

        let mut registry = Self::default();
        registry.register(Template::new("index", content));
        Ok(registry)
    }

    /// Register a template.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render a named template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        template.render(context)
    }
}

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Default index page template.
pub const DEFAULT_INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="rfhub-static {{ version }}">
    <title>{{ title }}</title>
    <link rel="stylesheet" href="static/style.css">
</head>
<body>
    <header class="site-header">
        <h1>{{ title }}</h1>
        <p class="summary">{{ library_count }} libraries, {{ keyword_count }} keywords</p>
        <input id="search" class="search-input" type="search" placeholder="Search keywords..." autocomplete="off">
        <ul id="search-results" class="search-results" hidden></ul>
    </header>
    <main class="content">
        <section class="libraries">
            <h2>Libraries</h2>
            {{ libraries_html }}
        </section>
        {{ categories_html }}
    </main>
    <footer class="site-footer">Generated by rfhub-static {{ version }}</footer>
    <script>window.RFHUB_SEARCH_DATA = {{ search_json }};</script>
    <script src="static/search.js"></script>
</body>
</html>
"##;
