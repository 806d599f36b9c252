//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    catalog::CatalogCommands, completions::CompletionsArgs, config::ConfigCommands,
    diagnose::DiagnoseArgs, library::LibraryCommands, mobile::MobileArgs, plan::PlanArgs,
    recover::RecoverArgs, scan::ScanArgs, secure::SecureArgs, staged::StagedCommands,
};

#[derive(Parser)]
#[command(name = "omnifix")]
#[command(author, version, about = "OmniFix PC repair assistant")]
#[command(long_about = "Diagnoses PC problems and builds repair plans. Asks the configured AI backend first and falls back to the local knowledge catalog.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Never contact the AI backend; answer from the local catalog only
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diagnose a problem from a free-text description
    Diagnose(DiagnoseArgs),

    /// Build a repair plan from risk labels
    Plan(PlanArgs),

    /// Analyze a system profile and plan repairs for its risks
    Scan(ScanArgs),

    /// Board-level diagnosis for a phone or tablet
    Mobile(MobileArgs),

    /// Data recovery chances, tools and steps
    Recover(RecoverArgs),

    /// Generate a Windows batch script for a security issue
    Secure(SecureArgs),

    /// ISO images, installers and mobile firmware
    #[command(subcommand)]
    Library(LibraryCommands),

    /// Browse the local knowledge catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Manage items staged for the portable kit
    #[command(subcommand)]
    Staged(StagedCommands),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text, or the configured default_format
    #[default]
    Auto,
    /// Human-readable text
    Text,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// Markdown tables
    Md,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <OutputFormat as ValueEnum>::from_str(s, true)
    }
}

impl GlobalOpts {
    /// Resolve `auto` against the configured default format
    pub fn resolved_format(&self, configured: Option<&str>) -> OutputFormat {
        match self.format {
            OutputFormat::Auto => configured
                .and_then(|f| f.parse().ok())
                .filter(|f| *f != OutputFormat::Auto)
                .unwrap_or(OutputFormat::Text),
            f => f,
        }
    }
}
