//! Chat command parsing.

use thiserror::Error;

/// Commands the bot answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    TopDay,
    /// Raw period argument, validated by the dispatcher so the reply can
    /// explain what went wrong.
    Stats { period: Option<String> },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("message is not a command")]
    NotACommand,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

/// Parse a chat message into a bot command.
pub fn parse_command(text: &str) -> Result<Command, CommandParseError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" | "/help" => Ok(Command::Help),
        "/top_day" => Ok(Command::TopDay),
        "/stats" => Ok(Command::Stats {
            period: parts.next().map(str::to_string),
        }),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Entries for the bot's "/" menu.
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("help", "Show what the bot can do"),
        ("top_day", "Yesterday's ranked leaderboard"),
        ("stats", "Your ranked stats: /stats day|week|month"),
    ]
}

#[must_use]
pub const fn command_help() -> &'static str {
    "Commands\n\
    /top_day - Yesterday's awards across the roster: MVP, LOH, Killer, Miposhka, \
    Suicider, Greedy, Damager, Nightfall and TimTim\n\
    /stats <day|week|month> - Your ranked win rate and average KDA\n\
    /help - This message"
}
