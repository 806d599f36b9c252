//! `omnifix secure` command - Batch script for a security issue

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::assistant::Assistant;
use crate::cli::commands::utils::{completion_client, join_words, load_catalog, note_source};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SecurityModule {
    /// Infections, adware, suspicious processes
    #[default]
    Malware,
    /// Slow boot, startup bloat
    Performance,
    /// Damaged system files
    Integrity,
}

impl std::fmt::Display for SecurityModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityModule::Malware => write!(f, "malware"),
            SecurityModule::Performance => write!(f, "performance"),
            SecurityModule::Integrity => write!(f, "integrity"),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SecureArgs {
    /// Area the script should address
    #[arg(long, short = 'm', value_enum, default_value_t = SecurityModule::Malware)]
    pub module: SecurityModule,

    /// Description of the issue
    #[arg(required = true, num_args = 1..)]
    pub issue: Vec<String>,

    /// Write the script to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run the secure command
pub fn run(args: SecureArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let assistant = Assistant::new(completion_client(&config, global), &catalog);

    let module = args.module.to_string();
    let answer = assistant.security_script(&module, &join_words(&args.issue));
    note_source(&[answer.source], global);

    match args.output {
        Some(path) => {
            fs::write(&path, &answer.value).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} script to {}",
                    style("✓").green(),
                    module,
                    style(path.display()).cyan()
                );
            }
        }
        None => print!("{}", answer.value),
    }
    Ok(())
}
