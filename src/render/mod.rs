//! Rendering boundaries.
//!
//! View rendering and content-entry rendering are external subsystems;
//! only their seams live here, with small implementations good enough for
//! serving static templates and inline entries.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::actions::RouteRequest;

/// Why a view could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("view template '{0}' not found")]
    TemplateNotFound(String),
    #[error("view io: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders a named view template.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, params: &BTreeMap<String, String>) -> Result<String, RenderError>;
}

/// Serves content entries by id.
pub trait EntrySource: Send + Sync {
    fn render_entry(&self, entry_id: i64, req: &RouteRequest) -> Option<String>;
}

/// View renderer reading templates from a directory.
///
/// Template `pages.about` maps to `<root>/pages/about.html`; dots are
/// path separators, dodging any `..` traversal through template names.
pub struct FileViews {
    root: PathBuf,
}

impl FileViews {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ViewRenderer for FileViews {
    fn render(&self, template: &str, _params: &BTreeMap<String, String>) -> Result<String, RenderError> {
        let mut path = self.root.clone();
        for part in template.split('.').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.set_extension("html");
        if !path.is_file() {
            return Err(RenderError::TemplateNotFound(template.to_string()));
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

/// In-memory templates, for tests and tiny deployments.
#[derive(Default)]
pub struct StaticViews {
    templates: HashMap<String, String>,
}

impl StaticViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, body: &str) {
        self.templates.insert(name.to_string(), body.to_string());
    }
}

impl ViewRenderer for StaticViews {
    fn render(&self, template: &str, _params: &BTreeMap<String, String>) -> Result<String, RenderError> {
        self.templates
            .get(template)
            .cloned()
            .ok_or_else(|| RenderError::TemplateNotFound(template.to_string()))
    }
}

/// In-memory entry bodies keyed by id.
#[derive(Default)]
pub struct MemoryEntries {
    entries: HashMap<i64, String>,
}

impl MemoryEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i64, body: &str) {
        self.entries.insert(id, body.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntrySource for MemoryEntries {
    fn render_entry(&self, entry_id: i64, _req: &RouteRequest) -> Option<String> {
        self.entries.get(&entry_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_views_lookup() {
        let mut views = StaticViews::new();
        views.insert("pages.about", "<h1>About</h1>");

        let params = BTreeMap::new();
        assert_eq!(views.render("pages.about", &params).unwrap(), "<h1>About</h1>");
        assert!(matches!(
            views.render("pages.missing", &params),
            Err(RenderError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_file_views_map_dots_to_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/about.html"), "<p>hi</p>").unwrap();

        let views = FileViews::new(dir.path());
        let params = BTreeMap::new();
        assert_eq!(views.render("pages.about", &params).unwrap(), "<p>hi</p>");
        assert!(views.render("pages.nope", &params).is_err());
    }
}
