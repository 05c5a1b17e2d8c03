//! Test doubles for the session orchestrator.
//!
//! [`RecordingEngine`] and [`RecordingWorkspace`] write every interaction into
//! a shared [`Journal`] so tests can assert on the order in which the
//! orchestrator talks to its collaborators.

use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    Command, DebugEngine, DocumentView, DocumentWorkspace, EngineError, Notification,
    SourceReader, Tabs,
};

/// Document sources held in memory, counting reads per path
#[derive(Debug, Default)]
pub struct InMemorySources {
    files: HashMap<PathBuf, String>,
    reads: RefCell<HashMap<PathBuf, usize>>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Number of times `path` has been read
    pub fn reads(&self, path: impl AsRef<Path>) -> usize {
        self.reads
            .borrow()
            .get(path.as_ref())
            .copied()
            .unwrap_or_default()
    }
}

impl SourceReader for InMemorySources {
    fn read(&self, path: &Path) -> io::Result<String> {
        *self.reads.borrow_mut().entry(path.to_path_buf()).or_default() += 1;
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

/// One interaction between the orchestrator and a collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Command(Command),
    CurrentFile,
    CurrentLine,
    AddTab(PathBuf),
    FocusTab(PathBuf),
}

/// Shared, ordered log of interactions
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: Entry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().clone()
    }

    /// Only the engine commands, in order
    pub fn commands(&self) -> Vec<Command> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Command(command) => Some(*command),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Debugging engine double.
///
/// Commands are recorded and never produce notifications by themselves; tests
/// publish notifications explicitly with [`RecordingEngine::notify`].
pub struct RecordingEngine {
    journal: Journal,
    position: Option<(PathBuf, usize)>,
    failing: Option<Command>,
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::with_journal(Journal::new())
    }

    pub fn with_journal(journal: Journal) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            journal,
            position: None,
            failing: None,
            tx,
            rx,
        }
    }

    /// Report `file:line` as the execution position from now on
    pub fn paused_at(mut self, file: impl Into<PathBuf>, line: usize) -> Self {
        self.set_position(file, line);
        self
    }

    pub fn set_position(&mut self, file: impl Into<PathBuf>, line: usize) {
        self.position = Some((file.into(), line));
    }

    pub fn clear_position(&mut self) {
        self.position = None;
    }

    /// Make `command` fail as if the engine had gone away
    pub fn failing_on(mut self, command: Command) -> Self {
        self.failing = Some(command);
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn commands(&self) -> Vec<Command> {
        self.journal.commands()
    }

    /// Publish a notification as the engine would
    pub fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }

    fn command(&mut self, command: Command) -> Result<(), EngineError> {
        self.journal.record(Entry::Command(command));
        if self.failing == Some(command) {
            return Err(EngineError::Disconnected);
        }
        Ok(())
    }
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugEngine for RecordingEngine {
    fn subscribe(&mut self) -> Receiver<Notification> {
        self.rx.clone()
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.command(Command::Start)
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.command(Command::Stop)
    }

    fn run(&mut self) -> Result<(), EngineError> {
        self.command(Command::Run)
    }

    fn step_over(&mut self) -> Result<(), EngineError> {
        self.command(Command::StepOver)
    }

    fn step_into(&mut self) -> Result<(), EngineError> {
        self.command(Command::StepInto)
    }

    fn step_out(&mut self) -> Result<(), EngineError> {
        self.command(Command::StepOut)
    }

    fn current_file(&self) -> Result<PathBuf, EngineError> {
        self.journal.record(Entry::CurrentFile);
        self.position
            .as_ref()
            .map(|(file, _)| file.clone())
            .ok_or(EngineError::NotSuspended)
    }

    fn current_line(&self) -> Result<usize, EngineError> {
        self.journal.record(Entry::CurrentLine);
        self.position
            .as_ref()
            .map(|(_, line)| *line)
            .ok_or(EngineError::NotSuspended)
    }
}

/// [`Tabs`] that also journal tab operations
#[derive(Debug, Default)]
pub struct RecordingWorkspace {
    journal: Journal,
    tabs: Tabs,
}

impl RecordingWorkspace {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            tabs: Tabs::new(),
        }
    }

    pub fn tabs(&self) -> &Tabs {
        &self.tabs
    }
}

impl DocumentWorkspace for RecordingWorkspace {
    fn add_tab(&mut self, view: DocumentView) {
        self.journal.record(Entry::AddTab(view.path().to_path_buf()));
        self.tabs.add_tab(view);
    }

    fn focus_tab(&mut self, path: &Path) -> bool {
        self.journal.record(Entry::FocusTab(path.to_path_buf()));
        self.tabs.focus_tab(path)
    }

    fn close_tab(&mut self, path: &Path) -> Option<DocumentView> {
        self.tabs.close_tab(path)
    }

    fn current_document(&self) -> Option<&DocumentView> {
        self.tabs.current_document()
    }

    fn current_document_mut(&mut self) -> Option<&mut DocumentView> {
        self.tabs.current_document_mut()
    }
}
