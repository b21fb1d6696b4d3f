use anyhow::Result;
use colored::Colorize;
use humor_core::session::SignInFlow;

use super::context::AppContext;

/// Prints the sign-in URL (or signs in directly with the demo backend).
pub async fn login(ctx: &AppContext) -> Result<()> {
    let _guard = ctx.init_tracing()?;
    let backend = ctx.backend().await?;
    let controller = ctx.controller(&backend);

    match controller.sign_in().await? {
        SignInFlow::Redirect { url } => {
            println!("{}", "Open this URL in your browser to sign in:".bright_yellow());
            println!("  {}", url);
            println!(
                "{}",
                "Then run `humor vote` and paste `callback <access_token> <refresh_token>`."
                    .bright_black()
            );
        }
        SignInFlow::Completed { session } => {
            println!("{}", format!("Signed in as {}", session.display_name()).green());
        }
    }
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    let _guard = ctx.init_tracing()?;
    let backend = ctx.backend().await?;
    let controller = ctx.controller(&backend);

    controller.sign_out().await?;
    println!("{}", "Signed out.".green());
    Ok(())
}
