//! Interactive voting prompt.
//!
//! - `command`: Line parsing
//! - `render`: State screens
//! - `helper`: rustyline completion and hints

mod command;
mod helper;
mod render;

use anyhow::Result;
use colored::Colorize;
use humor_application::{VoteOutcome, VotingController};
use humor_core::session::SignInFlow;
use humor_execution::VotingLogEvent;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;

use command::{ReplCommand, parse_command};
use helper::PromptHelper;
use render::{help_lines, render_state, screen_key};

pub struct Repl {
    controller: VotingController,
    backend_label: String,
    notices: Option<mpsc::UnboundedReceiver<VotingLogEvent>>,
}

impl Repl {
    pub fn new(
        controller: VotingController,
        backend_label: String,
        notices: mpsc::UnboundedReceiver<VotingLogEvent>,
    ) -> Self {
        Self {
            controller,
            backend_label,
            notices: Some(notices),
        }
    }

    /// Runs until `quit` or end of input.
    pub async fn run(mut self) -> Result<()> {
        println!("{}", "=== Humor Study ===".bright_magenta().bold());
        println!("{}", format!("backend: {}", self.backend_label).bright_black());
        println!("{}", "Type 'help' for commands.".bright_black());
        println!();

        let renderer = self.spawn_renderer();
        let notifier = self.notices.take().map(spawn_notifier);
        let listener = self.controller.attach();
        self.controller.start().await;

        let mut rl: Editor<PromptHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(PromptHelper::new()));

        loop {
            match rl.readline("vote> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    match parse_command(trimmed) {
                        Ok(Some(ReplCommand::Quit)) => break,
                        Ok(Some(command)) => self.execute(command).await,
                        Ok(None) => {}
                        Err(message) => println!("{}", message.yellow()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    break;
                }
            }
        }

        println!("{}", "Goodbye!".bright_green());
        drop(listener);
        renderer.abort();
        if let Some(notifier) = notifier {
            notifier.abort();
        }
        Ok(())
    }

    async fn execute(&self, command: ReplCommand) {
        match command {
            ReplCommand::Vote(value) => match self.controller.cast_vote(value).await {
                Ok(VoteOutcome::Recorded { .. }) => {}
                Ok(VoteOutcome::Ignored { reason }) => {
                    println!("{}", format!("Vote ignored: {}", reason).yellow());
                }
                Ok(VoteOutcome::Discarded) => {
                    println!("{}", "Session changed; vote result discarded.".bright_black());
                }
                Err(e) => {
                    println!("{}", format!("Vote not saved: {}", e).red());
                    println!("{}", "The caption is still current; vote again to retry.".bright_black());
                }
            },
            ReplCommand::Login => match self.controller.sign_in().await {
                Ok(SignInFlow::Redirect { url }) => {
                    println!("{}", "Open this URL in your browser to sign in:".bright_yellow());
                    println!("  {}", url);
                    println!(
                        "{}",
                        "Then paste: callback <access_token> <refresh_token>".bright_black()
                    );
                }
                Ok(SignInFlow::Completed { .. }) => {}
                Err(e) => println!("{}", format!("Sign-in failed: {}", e).red()),
            },
            ReplCommand::Callback(callback) => {
                if let Err(e) = self.controller.complete_sign_in(callback).await {
                    println!("{}", format!("Sign-in failed: {}", e).red());
                }
            }
            ReplCommand::Logout => {
                if let Err(e) = self.controller.sign_out().await {
                    println!("{}", format!("Sign-out failed: {}", e).red());
                }
            }
            ReplCommand::Retry => {
                self.controller.retry().await;
            }
            ReplCommand::Status => {
                print_lines(render_state(&self.controller.state().await));
            }
            ReplCommand::Help => print_lines(help_lines()),
            ReplCommand::Quit => {}
        }
    }

    /// Prints each new screen as the controller moves between states.
    fn spawn_renderer(&self) -> tokio::task::JoinHandle<()> {
        let mut states = self.controller.watch();
        tokio::spawn(async move {
            let mut last_key = {
                let state = states.borrow_and_update().clone();
                print_lines(render_state(&state));
                screen_key(&state)
            };
            while states.changed().await.is_ok() {
                let state = states.borrow_and_update().clone();
                let key = screen_key(&state);
                if key != last_key {
                    println!();
                    print_lines(render_state(&state));
                    last_key = key;
                }
            }
        })
    }
}

/// Prints session changes reported by the controller, which may arrive
/// while the prompt is idle (for example an expired session).
fn spawn_notifier(
    mut notices: mpsc::UnboundedReceiver<VotingLogEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = notices.recv().await {
            if let Some(kind) = event.field_str("event") {
                println!("{}", format!("· {} ({})", event.message, kind).bright_black());
            }
        }
    })
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
