use std::{fmt, str::FromStr};

/// User facing debugger commands, one per toolbar action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Stop,
    Run,
    StepOver,
    StepInto,
    StepOut,
}

impl Command {
    /// Every command, in toolbar order
    pub const ALL: [Command; 6] = [
        Command::Start,
        Command::Stop,
        Command::Run,
        Command::StepOver,
        Command::StepInto,
        Command::StepOut,
    ];

    /// Short name shown on the toolbar and accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Run => "run",
            Command::StepOver => "over",
            Command::StepInto => "in",
            Command::StepOut => "out",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Command::Start => 0,
            Command::Stop => 1,
            Command::Run => 2,
            Command::StepOver => 3,
            Command::StepInto => 4,
            Command::StepOut => 5,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "run" | "continue" | "c" => Ok(Command::Run),
            "over" | "step-over" | "n" => Ok(Command::StepOver),
            "in" | "step-into" | "s" => Ok(Command::StepInto),
            "out" | "step-out" | "f" => Ok(Command::StepOut),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for command in Command::ALL {
            assert_eq!(command.name().parse::<Command>(), Ok(command));
        }
    }

    #[test]
    fn aliases() {
        assert_eq!("c".parse::<Command>(), Ok(Command::Run));
        assert_eq!(" step-out ".parse::<Command>(), Ok(Command::StepOut));
    }

    #[test]
    fn unknown() {
        let err = "jump".parse::<Command>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command 'jump'");
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen = [false; 6];
        for command in Command::ALL {
            assert!(!seen[command.index()]);
            seen[command.index()] = true;
        }
    }
}
