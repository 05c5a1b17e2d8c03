use std::path::{Path, PathBuf};

use crate::Document;

/// A tab presenting one open document, with the execution marker line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    path: PathBuf,
    title: String,
    contents: String,
    line: Option<usize>,
}

impl DocumentView {
    pub fn new(document: &Document) -> Self {
        Self {
            path: document.path().to_path_buf(),
            title: document.filename().to_string(),
            contents: document.contents().to_string(),
            line: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Line of the execution marker, if execution has stopped in this document
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Scroll to and mark `line` (1-based)
    pub fn move_to_line(&mut self, line: usize) {
        tracing::trace!(path = %self.path.display(), %line, "moving to line");
        self.line = Some(line);
    }
}

/// The tabbed document area of the main window
pub trait DocumentWorkspace {
    /// Add a tab for `view` and bring it to the front
    fn add_tab(&mut self, view: DocumentView);

    /// Bring the tab for `path` to the front, returning false if there is none
    fn focus_tab(&mut self, path: &Path) -> bool;

    fn close_tab(&mut self, path: &Path) -> Option<DocumentView>;

    fn current_document(&self) -> Option<&DocumentView>;

    fn current_document_mut(&mut self) -> Option<&mut DocumentView>;
}

/// In-memory tab strip
#[derive(Debug, Default)]
pub struct Tabs {
    views: Vec<DocumentView>,
    active: Option<usize>,
}

impl Tabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentView> {
        self.views.iter()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.views.iter().position(|view| view.path() == path)
    }
}

impl DocumentWorkspace for Tabs {
    fn add_tab(&mut self, view: DocumentView) {
        tracing::debug!(path = %view.path().display(), "adding tab");
        self.views.push(view);
        self.active = Some(self.views.len() - 1);
    }

    fn focus_tab(&mut self, path: &Path) -> bool {
        match self.position(path) {
            Some(idx) => {
                self.active = Some(idx);
                true
            }
            None => false,
        }
    }

    fn close_tab(&mut self, path: &Path) -> Option<DocumentView> {
        let idx = self.position(path)?;
        let view = self.views.remove(idx);

        self.active = match self.active {
            _ if self.views.is_empty() => None,
            Some(active) if active > idx => Some(active - 1),
            Some(active) if active == idx => Some(idx.min(self.views.len() - 1)),
            other => other,
        };
        Some(view)
    }

    fn current_document(&self) -> Option<&DocumentView> {
        self.active.map(|idx| &self.views[idx])
    }

    fn current_document_mut(&mut self) -> Option<&mut DocumentView> {
        self.active.map(|idx| &mut self.views[idx])
    }
}
