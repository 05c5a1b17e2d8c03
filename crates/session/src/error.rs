use std::{io, path::PathBuf};

use crate::{Command, EngineError, SessionState};

/// Errors raised by the session orchestrator
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A command was requested that the current session state does not allow
    #[error("cannot {command} while the session is {state}")]
    InvalidState {
        command: Command,
        state: SessionState,
    },

    /// The document for a path could not be loaded
    #[error("could not open {}", path.display())]
    DocumentLoad {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    /// The debugging engine did not accept a command or answer a query
    #[error("lost contact with the debugging engine")]
    EngineCommunication(#[from] EngineError),

    /// No tab is open for the path
    #[error("no open document for {}", path.display())]
    UnknownDocument { path: PathBuf },
}

/// Reason a document could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("path is outside the project root {}", .0.display())]
    OutsideProjectRoot(PathBuf),
}
