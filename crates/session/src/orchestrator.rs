use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;

use crate::{
    ActionSurface, Command, DebugEngine, DocumentCache, DocumentView, DocumentWorkspace,
    FileSystem, Notification, SessionError, SessionState, SourceReader, utils,
};

/// Status text shown while no session is live
pub const IDLE_STATUS: &str = "Idle...";

/// Wires user commands to a [`DebugEngine`] and keeps the open documents,
/// the focused execution line and the toolbar in step with the session.
///
/// All handlers run on the caller's thread, one at a time. Engine
/// notifications are read from the channel returned by
/// [`Orchestrator::notifications`] (or drained with
/// [`Orchestrator::process_pending`]) and passed to [`Orchestrator::handle`].
pub struct Orchestrator<E, W, A, R = FileSystem> {
    engine: E,
    workspace: W,
    actions: A,
    documents: DocumentCache<R>,
    state: SessionState,
    notifications: Receiver<Notification>,
    status: String,
}

impl<E, W, A> Orchestrator<E, W, A, FileSystem>
where
    E: DebugEngine,
    W: DocumentWorkspace,
    A: ActionSurface,
{
    pub fn new(engine: E, workspace: W, actions: A) -> Self {
        Self::with_documents(engine, workspace, actions, DocumentCache::new())
    }
}

impl<E, W, A, R> Orchestrator<E, W, A, R>
where
    E: DebugEngine,
    W: DocumentWorkspace,
    A: ActionSurface,
    R: SourceReader,
{
    pub fn with_documents(
        mut engine: E,
        workspace: W,
        mut actions: A,
        documents: DocumentCache<R>,
    ) -> Self {
        let notifications = engine.subscribe();
        let state = SessionState::default();
        actions.apply_state(state);

        Self {
            engine,
            workspace,
            actions,
            documents,
            state,
            notifications,
            status: IDLE_STATUS.to_string(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn workspace(&self) -> &W {
        &self.workspace
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    pub fn documents(&self) -> &DocumentCache<R> {
        &self.documents
    }

    /// Engine notifications, for callers running their own event loop
    pub fn notifications(&self) -> Receiver<Notification> {
        self.notifications.clone()
    }

    /// Run a user command, reporting any failure on the status line
    #[tracing::instrument(skip(self))]
    pub fn dispatch(&mut self, command: Command) {
        let result = match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Run => self.run(),
            Command::StepOver => self.step_over(),
            Command::StepInto => self.step_into(),
            Command::StepOut => self.step_out(),
        };
        self.report(result);
    }

    /// React to an engine notification, reporting any failure on the status line
    #[tracing::instrument(skip(self))]
    pub fn handle(&mut self, notification: Notification) {
        let result = match notification {
            Notification::DebuggingStarted => self.on_debugging_started(),
            Notification::StepCompleted => self.on_step_completed(),
            Notification::SessionEnded => {
                self.on_session_ended();
                Ok(())
            }
        };
        self.report(result);
    }

    /// Handle every notification already queued by the engine.
    ///
    /// Returns the number of notifications handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(notification) = self.notifications.try_recv() {
            self.handle(notification);
            handled += 1;
        }
        handled
    }

    /// Turn a failed operation into status text
    pub fn report(&mut self, result: Result<(), SessionError>) {
        let Err(error) = result else {
            return;
        };

        let message = utils::error_chain(&error);
        tracing::warn!(error = %message, "operation failed");
        self.status = match error {
            SessionError::EngineCommunication(_) => format!("{message}; session reset"),
            _ => message,
        };
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.forward(Command::Start)?;
        self.status = "Waiting for the debuggee...".to_string();
        Ok(())
    }

    /// Stop the session. The session is idle as soon as the engine accepts the command.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.forward(Command::Stop)?;
        self.transition(SessionState::Idle);
        self.status = IDLE_STATUS.to_string();
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), SessionError> {
        self.forward(Command::Run)?;
        self.status = "Running...".to_string();
        Ok(())
    }

    pub fn step_over(&mut self) -> Result<(), SessionError> {
        self.forward(Command::StepOver)?;
        self.status = "Stepping over...".to_string();
        Ok(())
    }

    pub fn step_into(&mut self) -> Result<(), SessionError> {
        self.forward(Command::StepInto)?;
        self.status = "Stepping in...".to_string();
        Ok(())
    }

    pub fn step_out(&mut self) -> Result<(), SessionError> {
        self.forward(Command::StepOut)?;
        self.status = "Stepping out...".to_string();
        Ok(())
    }

    /// The debuggee is connected: show where it is and single-step into it
    #[tracing::instrument(skip(self))]
    pub fn on_debugging_started(&mut self) -> Result<(), SessionError> {
        if self.state.is_running() {
            tracing::warn!("session already running, ignoring");
            return Ok(());
        }

        let (file, line) = self.execution_position()?;
        let focused = self.focus(&file, line);
        self.transition(SessionState::Running);

        // pause at the first executable line
        self.forward(Command::StepInto)?;
        focused
    }

    /// A step finished: follow the execution cursor
    #[tracing::instrument(skip(self))]
    pub fn on_step_completed(&mut self) -> Result<(), SessionError> {
        if !self.state.is_running() {
            tracing::debug!("session is idle, ignoring late step completion");
            return Ok(());
        }

        let (file, line) = self.execution_position()?;
        self.focus(&file, line)
    }

    /// The debuggee exited on its own
    pub fn on_session_ended(&mut self) {
        if !self.state.is_running() {
            return;
        }
        tracing::debug!("debuggee finished");
        self.transition(SessionState::Idle);
        self.status = "Debugging session ended".to_string();
    }

    /// Open a document from outside the session, e.g. the file browser
    pub fn open_document(&mut self, path: impl AsRef<Path>) -> Result<&DocumentView, SessionError> {
        let view = self.open_or_focus(path.as_ref())?;
        Ok(&*view)
    }

    /// Close the tab for `path` and forget its contents
    pub fn close_document(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = self.documents.resolve(path.as_ref());
        let closed = self.workspace.close_tab(&path);
        let evicted = self.documents.evict(&path);

        if closed.is_none() && evicted.is_none() {
            return Err(SessionError::UnknownDocument { path });
        }
        tracing::debug!(path = %path.display(), "document closed");
        Ok(())
    }

    /// Show the document for `path`, opening a new tab only the first time.
    ///
    /// Returns the now current view.
    pub fn open_or_focus(&mut self, path: &Path) -> Result<&mut DocumentView, SessionError> {
        let path = self.documents.resolve(path);

        if self.documents.is_open(&path) {
            if !self.workspace.focus_tab(&path) {
                tracing::warn!(path = %path.display(), "cached document has no tab, restoring it");
                if let Some(document) = self.documents.get(&path) {
                    self.workspace.add_tab(DocumentView::new(document));
                }
            }
        } else {
            let document = self.documents.open(&path)?;
            self.workspace.add_tab(DocumentView::new(document));
        }

        self.workspace
            .current_document_mut()
            .ok_or(SessionError::UnknownDocument { path })
    }

    fn focus(&mut self, file: &Path, line: usize) -> Result<(), SessionError> {
        let view = self.open_or_focus(file)?;
        view.move_to_line(line);
        let status = format!("Stopped at {}:{line}", view.title());
        self.status = status;
        Ok(())
    }

    fn execution_position(&mut self) -> Result<(PathBuf, usize), SessionError> {
        let position = match self.engine.current_file() {
            Ok(file) => self.engine.current_line().map(|line| (file, line)),
            Err(e) => Err(e),
        };

        position.map_err(|e| {
            tracing::error!(error = %e, "querying execution position");
            self.transition(SessionState::Idle);
            SessionError::from(e)
        })
    }

    fn forward(&mut self, command: Command) -> Result<(), SessionError> {
        if !self.state.permits(command) {
            return Err(SessionError::InvalidState {
                command,
                state: self.state,
            });
        }

        tracing::debug!(%command, "sending command to engine");
        if let Err(e) = self.engine.execute(command) {
            tracing::error!(error = %e, %command, "engine command failed");
            self.transition(SessionState::Idle);
            return Err(e.into());
        }
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        tracing::debug!(from = %self.state, to = %next, "session state changed");
        self.state = next;
        self.actions.apply_state(next);
    }
}
