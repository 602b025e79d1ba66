use crate::app::AppContext;
use crate::cli::AssetCommands;
use crate::output::{assets_table, print_json};

pub fn handle(ctx: &AppContext, command: &AssetCommands) -> anyhow::Result<()> {
    match command {
        AssetCommands::List(args) => handle_list(ctx, args.json),
    }
}

fn handle_list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    let snapshot = repo.snapshot();
    if json {
        return print_json(&snapshot.assets);
    }
    println!("{}", assets_table(&snapshot.assets));
    if !ctx.quiet {
        println!("{} asset(s) in \"{}\"", snapshot.assets.len(), repo.active_project_name());
    }
    Ok(())
}
