//! TankTrack CLI - asset management for septic systems and cisterns
//!
//! Command-line interface over the tanktrack-core library: saved
//! projects, asset and price listings, recommendation rules, and the
//! remote recommendation engine.

mod app;
mod cli;
mod commands;
mod config;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.data_dir.clone(), cli.quiet)?;

    match &cli.command {
        Commands::Project(command) => commands::projects::handle(&ctx, command),
        Commands::Assets(command) => commands::assets::handle(&ctx, command),
        Commands::Prices(command) => commands::prices::handle(&ctx, command),
        Commands::Rules(command) => commands::rules::handle(&ctx, command),
        Commands::Recommend(args) => commands::engine::handle_recommend(&ctx, args.endpoint.clone()),
        Commands::Costs(args) => commands::engine::handle_costs(&ctx, args.endpoint.clone()),
        Commands::Config(command) => commands::config::handle(&ctx, command),
    }
}
