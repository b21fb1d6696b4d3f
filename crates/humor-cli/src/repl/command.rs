use humor_core::session::AuthCallback;
use humor_core::vote::VoteValue;

/// Words the prompt understands, used for completion and hints.
pub const COMMAND_WORDS: &[&str] = &[
    "up", "down", "login", "callback", "logout", "retry", "status", "help", "quit",
];

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Vote(VoteValue),
    Login,
    Callback(AuthCallback),
    Logout,
    Retry,
    Status,
    Help,
    Quit,
}

/// Parses one line. `Ok(None)` for blank input.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "up" | "+" | "+1" | "u" => ReplCommand::Vote(VoteValue::Up),
        "down" | "-" | "-1" | "d" => ReplCommand::Vote(VoteValue::Down),
        "login" | "signin" => ReplCommand::Login,
        "callback" => match args.as_slice() {
            [access, refresh] => ReplCommand::Callback(AuthCallback {
                access_token: access.to_string(),
                refresh_token: refresh.to_string(),
            }),
            [access] => ReplCommand::Callback(AuthCallback {
                access_token: access.to_string(),
                refresh_token: String::new(),
            }),
            _ => return Err("usage: callback <access_token> [refresh_token]".to_string()),
        },
        "logout" | "signout" => ReplCommand::Logout,
        "retry" => ReplCommand::Retry,
        "status" => ReplCommand::Status,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(Some(command))
}
