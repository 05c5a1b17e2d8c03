use std::{
    io::Read,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use session::utils::absolute_path;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("reading trace {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing trace")]
    Json(#[from] serde_json::Error),

    #[error("trace has no frames")]
    Empty,

    #[error("frame {index} has line 0, lines start at 1")]
    InvalidLine { index: usize },
}

/// One recorded stop of the debuggee
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Frame {
    pub file: PathBuf,
    pub line: usize,
    /// Call depth, 0 for the entry script
    #[serde(default)]
    pub depth: usize,
}

/// Recorded execution, in order
#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    frames: Vec<Frame>,
}

impl Trace {
    pub fn new(frames: Vec<Frame>) -> Result<Self, ReplayError> {
        let trace = Self { frames };
        trace.validate()?;
        Ok(trace)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ReplayError> {
        let trace: Trace = serde_json::from_reader(reader)?;
        trace.validate()?;
        Ok(trace)
    }

    /// Load a trace file.
    ///
    /// Frame paths become absolute: relative ones resolve against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let io_error = |source: std::io::Error| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        };

        let f = std::fs::File::open(path).map_err(io_error)?;
        let mut trace = Self::from_reader(f)?;

        let cwd = std::env::current_dir().map_err(io_error)?;
        let base = absolute_path(path.parent().unwrap_or(Path::new("")), &cwd);
        for frame in &mut trace.frames {
            frame.file = absolute_path(&frame.file, &base);
        }
        Ok(trace)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn validate(&self) -> Result<(), ReplayError> {
        if self.frames.is_empty() {
            return Err(ReplayError::Empty);
        }
        if let Some(index) = self.frames.iter().position(|frame| frame.line == 0) {
            return Err(ReplayError::InvalidLine { index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_with_default_depth() {
        let trace = Trace::from_reader(Cursor::new(
            r#"{"frames": [{"file": "/src/index.php", "line": 1}, {"file": "/src/lib.php", "line": 3, "depth": 1}]}"#,
        ))
        .unwrap();

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.frames()[0].depth, 0);
        assert_eq!(trace.frames()[1].depth, 1);
    }

    #[test]
    fn empty_trace() {
        let err = Trace::from_reader(Cursor::new(r#"{"frames": []}"#)).unwrap_err();
        assert!(matches!(err, ReplayError::Empty));
    }

    #[test]
    fn line_zero() {
        let err = Trace::from_reader(Cursor::new(
            r#"{"frames": [{"file": "a.php", "line": 1}, {"file": "a.php", "line": 0}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ReplayError::InvalidLine { index: 1 }));
    }

    #[test]
    fn malformed_json() {
        let err = Trace::from_reader(Cursor::new("not valid json {{{")).unwrap_err();
        assert!(matches!(err, ReplayError::Json(_)));
    }

    #[test]
    fn relative_frames_resolve_next_to_the_trace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        std::fs::write(
            &path,
            r#"{"frames": [{"file": "index.php", "line": 1}, {"file": "/abs/lib.php", "line": 2}]}"#,
        )
        .unwrap();

        let trace = Trace::from_path(&path).unwrap();
        assert_eq!(trace.frames()[0].file, dir.path().join("index.php"));
        assert_eq!(trace.frames()[1].file, PathBuf::from("/abs/lib.php"));
    }

    #[test]
    fn frames_from_a_relative_trace_path_are_absolute() {
        let dir = tempfile::tempdir_in(".").unwrap();
        std::fs::write(
            dir.path().join("trace.json"),
            r#"{"frames": [{"file": "lib/../index.php", "line": 1}]}"#,
        )
        .unwrap();
        let name = dir.path().file_name().unwrap();

        let trace = Trace::from_path(Path::new(name).join("trace.json")).unwrap();

        let expected = std::env::current_dir().unwrap().join(name).join("index.php");
        assert!(trace.frames()[0].file.is_absolute());
        assert_eq!(trace.frames()[0].file, expected);
    }

    #[test]
    fn missing_file() {
        let err = Trace::from_path("/tmp/nonexistent_pugdebug_trace.json").unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
    }
}
