//! Parsing of the line commands accepted by the interactive front end.

/// One user intent typed on a line of input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Command {
    Cancel,
    Commit,
    Confirm,
    Edit(String),
    Enter(String),
    Help,
    List,
    Refresh,
    Status,
}

/// Parses one input line.
///
/// Arguments keep their inner whitespace so paths with spaces survive; all
/// whitespace between the command word and the argument is dropped.
///
/// # Errors
/// Returns a message when the command word is unknown or a required
/// argument is missing.
pub(crate) fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim_start();
    let (word, argument) = line
        .split_once(char::is_whitespace)
        .map_or((line.trim_end(), ""), |(word, rest)| (word, rest.trim_start()));

    match word {
        "blur" | "commit" => Ok(Command::Commit),
        "cancel" | "q" | "quit" => Ok(Command::Cancel),
        "cd" => required_argument(word, argument).map(Command::Enter),
        "edit" => Ok(Command::Edit(argument.trim_end_matches(['\r', '\n']).to_string())),
        "help" | "?" => Ok(Command::Help),
        "ls" => Ok(Command::List),
        "ok" | "confirm" => Ok(Command::Confirm),
        "refresh" => Ok(Command::Refresh),
        "status" | "" => Ok(Command::Status),
        _ => Err(format!("Unknown command `{word}`. Type `help` for commands.")),
    }
}

fn required_argument(word: &str, argument: &str) -> Result<String, String> {
    let argument = argument.trim();
    if argument.is_empty() {
        return Err(format!("`{word}` needs an entry name"));
    }

    Ok(argument.to_string())
}
