use crate::app::AppContext;
use crate::cli::ProjectCommands;
use crate::output::projects_table;

pub fn handle(ctx: &AppContext, command: &ProjectCommands) -> anyhow::Result<()> {
    match command {
        ProjectCommands::List => handle_list(ctx),
        ProjectCommands::SaveAs(args) => handle_save_as(ctx, &args.name),
        ProjectCommands::Switch(args) => handle_switch(ctx, &args.id),
        ProjectCommands::Update => handle_update(ctx),
        ProjectCommands::Delete(args) => handle_delete(ctx, &args.id),
        ProjectCommands::Reset => handle_reset(ctx),
    }
}

fn handle_list(ctx: &AppContext) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    let projects = repo.list_projects();
    let active_id = repo.active_project_id();
    println!("{}", projects_table(&projects, &active_id));
    if !ctx.quiet && repo.has_unsaved_changes() {
        println!("The working data has unsaved changes.");
    }
    Ok(())
}

fn handle_save_as(ctx: &AppContext, name: &str) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    let summary = repo.save_as_new(name)?;
    if ctx.quiet {
        println!("{}", summary.id);
    } else {
        println!("Saved project \"{}\" ({})", summary.name, summary.id);
    }
    Ok(())
}

fn handle_switch(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    if repo.has_unsaved_changes() && !ctx.quiet {
        println!("Discarding unsaved changes to \"{}\"", repo.active_project_name());
    }
    repo.switch_to(id)?;
    if !ctx.quiet {
        println!("Active project: {}", repo.active_project_name());
    }
    Ok(())
}

fn handle_update(ctx: &AppContext) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    repo.update_current()?;
    if !ctx.quiet {
        println!("Saved changes to \"{}\"", repo.active_project_name());
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    repo.delete_project(id)?;
    if !ctx.quiet {
        println!("Deleted project {id}");
        println!("Active project: {}", repo.active_project_name());
    }
    Ok(())
}

fn handle_reset(ctx: &AppContext) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    repo.reset_to_defaults()?;
    if !ctx.quiet {
        println!("Working data reset to the built-in sample data");
    }
    Ok(())
}
