use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod repl;

use commands::context::AppContext;

#[derive(Parser)]
#[command(name = "humor")]
#[command(about = "Humor Study - vote on random captions", long_about = None)]
struct Cli {
    /// Path to config.toml (session and logs are kept next to it)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use the in-memory demo backend instead of the hosted project
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Vote on a random sample of captions (default)
    Vote,
    /// Print the sign-in URL
    Login,
    /// Sign out and remove stored tokens
    Logout,
    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config, cli.demo)?;

    match cli.command.unwrap_or(Commands::Vote) {
        Commands::Vote => commands::vote::run(&ctx).await?,
        Commands::Login => commands::auth::login(&ctx).await?,
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(&ctx),
            ConfigAction::Show => commands::config::show(&ctx)?,
        },
    }

    Ok(())
}
