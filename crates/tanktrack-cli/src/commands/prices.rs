use crate::app::AppContext;
use crate::cli::PriceCommands;
use crate::output::{prices_table, print_json};

pub fn handle(ctx: &AppContext, command: &PriceCommands) -> anyhow::Result<()> {
    match command {
        PriceCommands::List(args) => handle_list(ctx, args.json),
    }
}

fn handle_list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    let snapshot = repo.snapshot();
    if json {
        return print_json(&snapshot.repair_prices);
    }
    println!("{}", prices_table(&snapshot.repair_prices));
    Ok(())
}
