use std::path::PathBuf;

use crossbeam_channel::Receiver;

use crate::Command;

/// Asynchronous notifications published by a debugging engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The debuggee is connected and suspended at its entry point
    DebuggingStarted,
    /// A step command finished and the debuggee is suspended again
    StepCompleted,
    /// The debuggee finished without being asked to stop
    SessionEnded,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("debuggee is not suspended")]
    NotSuspended,

    #[error("engine disconnected")]
    Disconnected,

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The contract a debugging engine must satisfy to drive a session.
///
/// Commands are fire-and-forget: they return as soon as the command has been
/// handed to the engine, and completion is reported later on the channel
/// returned by [`DebugEngine::subscribe`]. Notifications must arrive in the
/// order their commands complete.
pub trait DebugEngine {
    /// Register for notifications. Called once, when the orchestrator is built.
    fn subscribe(&mut self) -> Receiver<Notification>;

    fn start(&mut self) -> Result<(), EngineError>;
    fn stop(&mut self) -> Result<(), EngineError>;
    fn run(&mut self) -> Result<(), EngineError>;
    fn step_over(&mut self) -> Result<(), EngineError>;
    fn step_into(&mut self) -> Result<(), EngineError>;
    fn step_out(&mut self) -> Result<(), EngineError>;

    /// File the debuggee is suspended in. Only valid while suspended.
    fn current_file(&self) -> Result<PathBuf, EngineError>;

    /// 1-based line the debuggee is suspended at. Only valid while suspended.
    fn current_line(&self) -> Result<usize, EngineError>;

    fn execute(&mut self, command: Command) -> Result<(), EngineError> {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Run => self.run(),
            Command::StepOver => self.step_over(),
            Command::StepInto => self.step_into(),
            Command::StepOut => self.step_out(),
        }
    }
}
