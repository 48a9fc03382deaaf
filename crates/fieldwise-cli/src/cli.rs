use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fieldwise",
    about = "Fieldwise — fold one record onto another, field by field",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge an incoming JSON record onto a base JSON record
    Merge(MergeArgs),
    /// List schemas and their resolved field policies
    Schemas(SchemasArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// TOML schema file
    #[arg(short, long)]
    pub schemas: PathBuf,
    /// Name of the schema both records follow
    #[arg(long)]
    pub schema: String,
    /// Base record (JSON object)
    pub base: PathBuf,
    /// Incoming record (JSON object)
    pub incoming: PathBuf,
    /// Write the merged record here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Print per-field outcomes
    #[arg(long)]
    pub report: bool,
}

#[derive(Args)]
pub struct SchemasArgs {
    /// TOML schema file
    #[arg(short, long)]
    pub schemas: PathBuf,
}
