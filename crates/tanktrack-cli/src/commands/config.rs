use crate::app::AppContext;
use crate::cli::ConfigCommands;
use crate::config::{config_path, write_config};

pub fn handle(ctx: &AppContext, command: &ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => handle_show(ctx),
        ConfigCommands::SetEngineUrl(args) => handle_set_engine_url(ctx, &args.url),
    }
}

fn handle_show(ctx: &AppContext) -> anyhow::Result<()> {
    let config = ctx.read_config()?;
    println!("Data directory: {}", ctx.data_dir.display());
    println!("Config file: {}", config_path(&ctx.data_dir).display());
    println!(
        "Engine URL: {}",
        config.engine.url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "Engine bearer token: {}",
        if config.engine.bearer_token.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    Ok(())
}

fn handle_set_engine_url(ctx: &AppContext, url: &str) -> anyhow::Result<()> {
    let mut config = ctx.read_config()?;
    config.engine.url = Some(url.to_string());
    write_config(&ctx.data_dir, &config)?;
    if !ctx.quiet {
        println!("Engine URL set to {url}");
    }
    Ok(())
}
