use anyhow::{Context, Result};

use super::context::AppContext;

pub fn path(ctx: &AppContext) {
    println!("{}", ctx.config_file.display());
}

/// Prints the effective configuration with the publishable key masked.
pub fn show(ctx: &AppContext) -> Result<()> {
    let mut config = ctx.config.clone();
    config.supabase.publishable_key = config.supabase.masked_key();

    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("# {}", ctx.config_file.display());
    print!("{}", rendered);
    Ok(())
}
