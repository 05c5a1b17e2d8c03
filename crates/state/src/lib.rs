//! The state module remembers which documents were open between sessions.

use std::{
    io::Read,
    io::Write,
    path::{Path, PathBuf},
};

use eyre::Context;
use serde::{Deserialize, Serialize};
use session::{DocumentWorkspace, Tabs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct StateManager {
    save_path: PathBuf,
    current: Persistence,
}

impl StateManager {
    pub fn new(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();
        let span = tracing::debug_span!("StateManager", state_path = %path.display());
        let _guard = span.enter();

        tracing::debug!("attempting to load state");
        match crate::load_from(&path) {
            Ok(state) => {
                tracing::debug!("state loaded");
                Ok(Self {
                    save_path: path,
                    current: state,
                })
            }
            Err(e) => {
                tracing::debug!(error = %e, "loading state file, starting afresh");
                let state = Persistence::default();
                crate::save_to(&state, &path).wrap_err("saving state file")?;

                Ok(Self {
                    save_path: path,
                    current: state,
                })
            }
        }
    }

    /// `<data dir>/pugdebug/state.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("pugdebug").join("state.json"))
    }

    pub fn save(self) -> eyre::Result<Self> {
        crate::save_to(&self.current, &self.save_path).wrap_err("saving state")?;
        Ok(self)
    }

    pub fn current(&self) -> &Persistence {
        &self.current
    }

    /// Remember the tabs currently open
    pub fn record(&mut self, tabs: &Tabs) {
        self.current = Persistence::from_tabs(tabs);
    }
}

/// State that is persisted
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Persistence {
    pub version: String,
    #[serde(default)]
    pub open_documents: Vec<PathBuf>,
    #[serde(default)]
    pub focused: Option<PathBuf>,
}

impl Default for Persistence {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            open_documents: Vec::new(),
            focused: None,
        }
    }
}

impl Persistence {
    pub fn from_tabs(tabs: &Tabs) -> Self {
        Self {
            version: VERSION.to_string(),
            open_documents: tabs.iter().map(|view| view.path().to_path_buf()).collect(),
            focused: tabs
                .current_document()
                .map(|view| view.path().to_path_buf()),
        }
    }
}

pub fn save(state: &Persistence, writer: impl Write) -> eyre::Result<()> {
    serde_json::to_writer_pretty(writer, state).context("saving workspace state")?;
    Ok(())
}

pub fn save_to(state: &Persistence, path: impl AsRef<Path>) -> eyre::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("creating state directory")?;
    }
    let f = std::fs::File::create(path).context("creating file for saving")?;
    save(state, &f).context("saving state")?;
    Ok(())
}

pub fn load(reader: impl Read) -> eyre::Result<Persistence> {
    let st = serde_json::from_reader(reader).context("reading workspace state")?;
    Ok(st)
}

pub fn load_from(path: impl AsRef<Path>) -> eyre::Result<Persistence> {
    let path = path.as_ref();
    let f = std::fs::File::open(path)
        .with_context(|| format!("opening save state {}", path.display()))?;
    let state = load(f).context("reading from state file")?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::{Document, DocumentView};
    use std::io::Cursor;

    fn tabs(paths: &[&str]) -> Tabs {
        let mut tabs = Tabs::new();
        for path in paths {
            tabs.add_tab(DocumentView::new(&Document::new(*path, "")));
        }
        tabs
    }

    #[test]
    fn round_trip_save_and_load() {
        let state = Persistence {
            version: "1.0".to_string(),
            open_documents: vec![PathBuf::from("/src/index.php")],
            focused: Some(PathBuf::from("/src/index.php")),
        };

        let mut buf = Vec::new();
        save(&state, &mut buf).unwrap();

        let loaded = load(Cursor::new(&buf)).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_malformed_json() {
        let bad_json = Cursor::new(b"not valid json {{{");
        let result = load(bad_json);
        assert!(result.is_err());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let loaded = load(Cursor::new(br#"{"version": "0.1.0"}"#)).unwrap();
        assert!(loaded.open_documents.is_empty());
        assert!(loaded.focused.is_none());
    }

    #[test]
    fn load_from_missing_file() {
        let result = load_from("/tmp/nonexistent_pugdebug_state_file.json");
        assert!(result.is_err());
    }

    #[test]
    fn captures_tab_order_and_focus() {
        let mut tabs = tabs(&["/src/index.php", "/src/lib.php"]);
        tabs.focus_tab(Path::new("/src/index.php"));

        let state = Persistence::from_tabs(&tabs);
        assert_eq!(
            state.open_documents,
            vec![
                PathBuf::from("/src/index.php"),
                PathBuf::from("/src/lib.php")
            ]
        );
        assert_eq!(state.focused, Some(PathBuf::from("/src/index.php")));
    }

    #[test]
    fn state_manager_creates_default_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let manager = StateManager::new(&path).unwrap();
        assert!(manager.current().open_documents.is_empty());

        // File should have been created
        assert!(path.exists());
    }

    #[test]
    fn state_manager_record_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut manager = StateManager::new(&path).unwrap();
        manager.record(&tabs(&["/src/lib.php"]));
        let manager = manager.save().unwrap();

        let reloaded = StateManager::new(&path).unwrap();
        assert_eq!(reloaded.current(), manager.current());
        assert_eq!(
            reloaded.current().focused,
            Some(PathBuf::from("/src/lib.php"))
        );
    }
}
