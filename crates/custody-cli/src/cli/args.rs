use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "custody",
    version,
    about = "Administer, score and track custody tests for AI agents"
)]
pub struct Cli {
    /// tracing filter, e.g. `info` or `custody_core=debug`
    #[arg(long, global = true, env = "CUSTODY_LOG", default_value = "info")]
    pub log_level: String,

    /// log output on stderr: text|json
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample custody.yaml
    Init(InitArgs),
    /// Administer one custody test to an agent
    Administer(AdministerArgs),
    /// Run a collaborative or olympic test across several agents
    Group(GroupArgs),
    /// Score a single answer without recording it
    Score(ScoreArgs),
    /// Aggregate results across agents
    Analytics(AnalyticsArgs),
    /// Show one agent's progression and eligibility
    Status(StatusArgs),
    /// Zero an agent's custody counters and history
    Reset(ResetArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    #[arg(long, default_value = "custody.yaml")]
    pub config: PathBuf,

    #[arg(long, default_value = ".custody/custody.db")]
    pub db: PathBuf,

    /// fail on unknown config keys instead of warning
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ResponderArgs {
    /// responder: template|file
    #[arg(long, default_value = "template")]
    pub responder: String,

    /// answer file used by `--responder file`
    #[arg(long)]
    pub response_file: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "custody.yaml")]
    pub config: PathBuf,

    /// overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AdministerArgs {
    pub agent: String,

    /// test category (defaults to settings.default_category)
    #[arg(long)]
    pub category: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub responder: ResponderArgs,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct GroupArgs {
    /// collaborative|olympic
    #[arg(long, default_value = "collaborative")]
    pub kind: String,

    /// comma separated participants
    #[arg(long, value_delimiter = ',', required = true)]
    pub agents: Vec<String>,

    #[arg(long, default_value = "basic")]
    pub difficulty: String,

    #[arg(long, default_value = "cross_ai_collaboration")]
    pub category: String,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub responder: ResponderArgs,

    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScoreArgs {
    /// answer text; mutually exclusive with --file
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long, default_value = "basic")]
    pub difficulty: String,

    /// scenario the answer responds to
    #[arg(long)]
    pub scenario: Option<String>,

    /// JSON test content the answer responds to
    #[arg(long)]
    pub content: Option<PathBuf>,

    #[arg(long, default_value = "custody.yaml")]
    pub config: PathBuf,

    #[arg(long)]
    pub strict: bool,

    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AnalyticsArgs {
    /// restrict to one agent
    #[arg(long)]
    pub agent: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatusArgs {
    pub agent: String,

    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ResetArgs {
    pub agent: String,

    #[command(flatten)]
    pub store: StoreArgs,
}
