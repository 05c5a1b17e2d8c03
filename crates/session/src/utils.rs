use std::{
    borrow::Cow,
    error::Error,
    path::{Component, Path, PathBuf},
};

pub fn normalise_path(path: &Path) -> Cow<'_, Path> {
    // Try to expand tilde prefix to home directory
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped));
        }
        // If home directory cannot be determined, log and return path as-is
        tracing::warn!("cannot determine home directory, using path as-is");
    }
    Cow::Borrowed(path)
}

/// Resolve `path` to an absolute path without touching the file system.
///
/// Relative paths are joined onto `base`, `.` components are dropped and `..`
/// components remove their parent.
pub fn absolute_path(path: &Path, base: &Path) -> PathBuf {
    let path = normalise_path(path);
    let joined = if path.is_relative() {
        base.join(path)
    } else {
        path.into_owned()
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Render an error and its sources on one line, for the status bar
pub fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            normalise_path(Path::new("~/src/index.php")),
            home_dir.join("src/index.php")
        );
    }

    #[test]
    fn relative_paths_join_the_base() {
        assert_eq!(
            absolute_path(Path::new("lib/../src/./index.php"), Path::new("/project")),
            PathBuf::from("/project/src/index.php")
        );
    }

    #[test]
    fn absolute_paths_ignore_the_base() {
        assert_eq!(
            absolute_path(Path::new("/src/lib.php"), Path::new("/project")),
            PathBuf::from("/src/lib.php")
        );
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = crate::SessionError::DocumentLoad {
            path: PathBuf::from("/src/missing.php"),
            source: crate::LoadError::OutsideProjectRoot(PathBuf::from("/project")),
        };
        assert_eq!(
            error_chain(&err),
            "could not open /src/missing.php: path is outside the project root /project"
        );
    }
}
