//! CLI argument definitions

use caseground_core::Backend;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caseground")]
#[command(
    author,
    version,
    about = "Draft occupational-therapy reports grounded in prior case records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a report for a case description
    Generate(GenerateArgs),

    /// Show how a case description splits into domain queries
    Decompose(CaseInput),

    /// Show the grounding context retrieved for a case description
    Retrieve(RetrieveArgs),

    /// Embed structured report files into the index
    Ingest(IngestArgs),

    /// Show index status and service configuration
    Status,
}

/// Case text from an argument, a file, or stdin
#[derive(Args)]
pub struct CaseInput {
    /// Case description (read from stdin when omitted)
    pub text: Option<String>,

    /// Read the case description from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: CaseInput,

    /// Generation backend
    #[arg(short, long, value_enum, default_value = "local")]
    pub backend: BackendArg,
}

#[derive(Args)]
pub struct RetrieveArgs {
    #[command(flatten)]
    pub input: CaseInput,

    /// Results per domain query (defaults to 3 for several domains, 5 for one)
    #[arg(short = 'k', long)]
    pub k: Option<usize>,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Directory containing structured report JSON files
    pub dir: PathBuf,

    /// File pattern, relative to the directory
    #[arg(long, default_value = caseground_core::index::DEFAULT_REPORT_PATTERN)]
    pub pattern: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Local,
    Cloud,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Local => Backend::Local,
            BackendArg::Cloud => Backend::Cloud,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
