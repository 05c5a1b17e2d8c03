//! User settings, read from a TOML file.

use std::path::{Path, PathBuf};

use eyre::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Documents outside this directory are refused. Relative paths resolve against it.
    pub project_root: Option<PathBuf>,

    /// Lines shown either side of the execution marker
    pub context_lines: usize,

    /// Where the list of open documents is remembered
    pub state_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_root: None,
            context_lines: DEFAULT_CONTEXT_LINES,
            state_file: None,
        }
    }
}

impl Settings {
    /// `<config dir>/pugdebug/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pugdebug").join("settings.toml"))
    }

    pub fn from_toml(s: &str) -> eyre::Result<Self> {
        toml::from_str(s).context("parsing settings")
    }

    /// Load settings from `path`, falling back to defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let span = tracing::debug_span!("Settings", path = %path.display());
        let _guard = span.enter();

        if !path.exists() {
            tracing::debug!("no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings = Self::from_toml(&contents)?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("creating settings directory")?;
        }
        let contents = toml::to_string_pretty(self).context("serialising settings")?;
        std::fs::write(path, contents)
            .with_context(|| format!("writing settings file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_toml(r#"project_root = "/var/www""#).unwrap();
        assert_eq!(settings.project_root, Some(PathBuf::from("/var/www")));
        assert_eq!(settings.context_lines, DEFAULT_CONTEXT_LINES);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = Settings {
            project_root: Some(PathBuf::from("/srv/app")),
            context_lines: 5,
            state_file: Some(PathBuf::from("/tmp/state.json")),
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
