//! Debug session orchestration
//!
//! Keeps a cache of open source documents, the focused execution line and the
//! toolbar affordances in step with a pluggable debugging engine.
mod actions;
mod command;
mod documents;
mod engine;
mod error;
mod orchestrator;
mod state;
pub mod testing;
pub mod utils;
mod workspace;

pub use actions::{ActionSurface, Toolbar};
pub use command::{Command, UnknownCommand};
pub use documents::{Document, DocumentCache, FileSystem, SourceReader};
pub use engine::{DebugEngine, EngineError, Notification};
pub use error::{LoadError, SessionError};
pub use orchestrator::{IDLE_STATUS, Orchestrator};
pub use state::SessionState;
pub use workspace::{DocumentView, DocumentWorkspace, Tabs};
