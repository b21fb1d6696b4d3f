use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use super::command::COMMAND_WORDS;

/// Completion, hints and highlighting for the voting prompt.
#[derive(Clone)]
pub struct PromptHelper {
    commands: Vec<&'static str>,
}

impl PromptHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMAND_WORDS.to_vec(),
        }
    }

    fn first_match(&self, prefix: &str) -> Option<&'static str> {
        self.commands
            .iter()
            .copied()
            .find(|cmd| cmd.starts_with(prefix) && cmd.len() > prefix.len())
    }
}

impl Helper for PromptHelper {}

impl Completer for PromptHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for PromptHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match line.trim() {
            "+" | "up" => Owned(line.bright_green().to_string()),
            "-" | "down" => Owned(line.bright_red().to_string()),
            _ => Borrowed(line),
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for PromptHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.first_match(line).map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for PromptHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_completes_unique_prefix() {
        let helper = PromptHelper::new();
        assert_eq!(helper.first_match("ca"), Some("callback"));
        assert_eq!(helper.first_match("lo"), Some("login"));
        assert_eq!(helper.first_match("quit"), None);
    }
}
