//! Parsing of input lines into console commands.

use duet_core::{Intent, Stimulus};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forward a stimulus to the session.
    Stimulus(Stimulus),
    /// Replace the allowed intents.
    SetIntents(Vec<Intent>),
    /// Pause reading input. Lets scripts space their stimuli out.
    Wait(Duration),
    /// Log a session snapshot.
    Status,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '/{0}'")]
    Unknown(String),
    #[error("invalid intent list: {0}")]
    Intents(String),
    #[error("'/wait' takes a number of milliseconds, got '{0}'")]
    Wait(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Stimulus(Stimulus::Text(line.to_string()))));
    };

    let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let command = match name {
        "click" => Command::Stimulus(Stimulus::Click),
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        "wait" => {
            let millis = args
                .trim()
                .parse::<u64>()
                .map_err(|_| CommandError::Wait(args.trim().to_string()))?;
            Command::Wait(Duration::from_millis(millis))
        }
        "intents" => {
            let intents = args
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<Intent>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(CommandError::Intents)?;
            Command::SetIntents(intents)
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
