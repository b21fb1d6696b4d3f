use colored::Colorize;
use humor_application::VotingState;

/// Lines describing `state` for the terminal.
pub fn render_state(state: &VotingState) -> Vec<String> {
    match state {
        VotingState::Unauthenticated => vec![
            "Welcome to Humor Study!".bright_magenta().bold().to_string(),
            "Type `login` to sign in with Google.".bright_black().to_string(),
        ],
        VotingState::Loading { user } => vec![
            format!("Welcome, {}!", user.display_name()).bright_magenta().to_string(),
            "Loading captions...".bright_black().to_string(),
        ],
        VotingState::Error { message } => vec![
            format!("Something went wrong: {}", message).red().to_string(),
            "Type `retry` to try again.".bright_black().to_string(),
        ],
        VotingState::Voting {
            current,
            position,
            total,
            ..
        } => {
            let mut lines = vec![
                format!("[{}/{}]", position + 1, total).bright_black().to_string(),
                format!("  \"{}\"", current.content).bright_blue().bold().to_string(),
            ];
            if let Some(image) = &current.image {
                lines.push(
                    format!("  image: {} <{}>", image.alt_text(), image.url)
                        .bright_black()
                        .to_string(),
                );
            }
            lines.push("  up (+)  /  down (-)".yellow().to_string());
            lines
        }
        VotingState::Complete { user, total: 0, .. } => vec![
            format!("No captions to vote on right now, {}.", user.display_name())
                .bright_yellow()
                .to_string(),
        ],
        VotingState::Complete { user, total, tally } => vec![
            format!("All done! You voted on {} captions.", total)
                .bright_green()
                .bold()
                .to_string(),
            format!("  +{} / -{}", tally.up, tally.down).green().to_string(),
            format!("Thanks, {}.", user.display_name()).bright_black().to_string(),
        ],
    }
}

/// Identifies what is on screen; a pending-vote toggle is not a new screen.
pub fn screen_key(state: &VotingState) -> String {
    format!(
        "{}:{}:{}",
        state.name(),
        state.cursor().map(|c| c.to_string()).unwrap_or_default(),
        state.user().map(|u| u.user_id.as_str()).unwrap_or_default()
    )
}

pub fn help_lines() -> Vec<String> {
    [
        ("up, +", "vote the current caption up"),
        ("down, -", "vote the current caption down"),
        ("login", "sign in"),
        ("callback <access> <refresh>", "finish a browser sign-in"),
        ("logout", "sign out"),
        ("retry", "start over after an error"),
        ("status", "show the current screen again"),
        ("quit", "exit"),
    ]
    .iter()
    .map(|(cmd, what)| format!("  {} {}", format!("{:<30}", cmd).cyan(), what.bright_black()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use humor_core::caption::CaptionItem;
    use humor_core::session::Session;
    use humor_core::vote::VoteTally;

    fn voting(position: usize, vote_pending: bool) -> VotingState {
        VotingState::Voting {
            user: Session::new("u-1", None),
            current: CaptionItem::new("c-1", "Cats in meetings")
                .with_image("https://img/cat.png", None),
            position,
            total: 5,
            tally: VoteTally::default(),
            vote_pending,
        }
    }

    #[test]
    fn test_voting_screen_shows_progress_and_image() {
        colored::control::set_override(false);
        let lines = render_state(&voting(1, false));

        assert_eq!(lines[0], "[2/5]");
        assert!(lines[1].contains("Cats in meetings"));
        assert!(lines[2].contains("Caption image"));
    }

    #[test]
    fn test_pending_vote_is_same_screen() {
        assert_eq!(screen_key(&voting(1, false)), screen_key(&voting(1, true)));
        assert_ne!(screen_key(&voting(1, false)), screen_key(&voting(2, false)));
    }

    #[test]
    fn test_empty_completion_message() {
        colored::control::set_override(false);
        let lines = render_state(&VotingState::Complete {
            user: Session::new("u-1", Some("a@b.c".to_string())),
            total: 0,
            tally: VoteTally::default(),
        });
        assert_eq!(lines, vec!["No captions to vote on right now, a@b.c.".to_string()]);
    }
}
