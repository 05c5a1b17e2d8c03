use std::fmt;

use crate::Command;

/// Whether a debugging session is currently live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
}

impl SessionState {
    /// Whether `command` is valid in this state.
    ///
    /// Only `start` is valid while idle; everything else requires a live session.
    pub fn permits(self, command: Command) -> bool {
        match self {
            SessionState::Idle => command == Command::Start,
            SessionState::Running => command != Command::Start,
        }
    }

    pub fn is_running(self) -> bool {
        self == SessionState::Running
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::Running => f.write_str("running"),
        }
    }
}
