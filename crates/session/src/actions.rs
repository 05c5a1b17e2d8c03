use crate::{Command, SessionState};

/// Enabled/disabled affordances for the six debugger commands
pub trait ActionSurface {
    fn set_enabled(&mut self, command: Command, enabled: bool);

    /// Toggle every command to match `state` in one go
    fn apply_state(&mut self, state: SessionState) {
        for command in Command::ALL {
            self.set_enabled(command, state.permits(command));
        }
    }
}

/// Toolbar model, everything disabled until a state is applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolbar {
    enabled: [bool; 6],
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, command: Command) -> bool {
        self.enabled[command.index()]
    }

    pub fn enabled_commands(&self) -> impl Iterator<Item = Command> + '_ {
        Command::ALL
            .into_iter()
            .filter(|command| self.is_enabled(*command))
    }
}

impl ActionSurface for Toolbar {
    fn set_enabled(&mut self, command: Command, enabled: bool) {
        self.enabled[command.index()] = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_toolbar() {
        let mut toolbar = Toolbar::new();
        toolbar.apply_state(SessionState::Idle);
        assert_eq!(
            toolbar.enabled_commands().collect::<Vec<_>>(),
            vec![Command::Start]
        );
    }

    #[test]
    fn running_toolbar() {
        let mut toolbar = Toolbar::new();
        toolbar.apply_state(SessionState::Running);
        assert!(!toolbar.is_enabled(Command::Start));
        assert_eq!(toolbar.enabled_commands().count(), 5);
    }
}
