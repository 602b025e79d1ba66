use clap::{Args, Parser, Subcommand};

use tanktrack_core::VERSION;

/// TankTrack - asset management for septic systems and cisterns
#[derive(Parser)]
#[command(name = "tanktrack")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding projects and configuration
    #[arg(short, long, global = true, env = "TANKTRACK_DATA")]
    pub data_dir: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage saved projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Work with the active project's assets
    #[command(subcommand)]
    Assets(AssetCommands),

    /// Work with the active project's repair price catalog
    #[command(subcommand)]
    Prices(PriceCommands),

    /// Manage recommendation rules
    #[command(subcommand)]
    Rules(RuleCommands),

    /// Request repair recommendations for every asset
    Recommend(EngineArgs),

    /// Estimate repair costs for recommended work
    Costs(EngineArgs),

    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List saved projects
    List,

    /// Save the working data as a new named project
    SaveAs(SaveAsArgs),

    /// Switch to another project (discards unsaved edits)
    Switch(ProjectIdArgs),

    /// Save the working data over the active project
    Update,

    /// Delete a saved project
    Delete(ProjectIdArgs),

    /// Replace the working data with the built-in sample data
    Reset,
}

#[derive(Args)]
pub struct SaveAsArgs {
    /// Name for the new project
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args)]
pub struct ProjectIdArgs {
    /// Project ID
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Subcommand)]
pub enum AssetCommands {
    /// List assets in the active project
    List(ListArgs),
}

#[derive(Subcommand)]
pub enum PriceCommands {
    /// List the repair price catalog
    List(ListArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum RuleCommands {
    /// List rules as the engine will read them
    List,

    /// Add a single-condition rule
    Add(RuleAddArgs),

    /// Delete a rule by ID
    Delete(RuleIdArgs),
}

#[derive(Args)]
pub struct RuleAddArgs {
    /// Column the condition reads (e.g. overallCondition)
    #[arg(long, value_name = "COLUMN")]
    pub column: String,

    /// Comparison operator (eq, neq, gt, gte, lt, lte, contains)
    #[arg(long, value_name = "OP")]
    pub operator: String,

    /// Value to compare against
    #[arg(long, value_name = "VALUE")]
    pub value: String,

    /// Recommendation text to emit when the rule matches
    #[arg(long, value_name = "TEXT", conflicts_with = "life")]
    pub recommend: Option<String>,

    /// Remaining-life band to assign when the rule matches (e.g. "0-5")
    #[arg(long, value_name = "BAND")]
    pub life: Option<String>,
}

#[derive(Args)]
pub struct RuleIdArgs {
    /// Rule ID
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args)]
pub struct EngineArgs {
    /// Engine base URL (overrides config and TANKTRACK_ENGINE_URL)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved configuration
    Show,

    /// Set the recommendation engine base URL
    SetEngineUrl(SetEngineUrlArgs),
}

#[derive(Args)]
pub struct SetEngineUrlArgs {
    /// Engine base URL
    #[arg(value_name = "URL")]
    pub url: String,
}
