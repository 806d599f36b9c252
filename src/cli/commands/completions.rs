//! `omnifix completions` command - Shell completion scripts
//!
//! ```bash
//! source <(omnifix completions bash)
//! omnifix completions fish > ~/.config/fish/completions/omnifix.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::{IntoDiagnostic, Result};
use std::io::Write;

use crate::cli::Cli;

const BIN_NAME: &str = "omnifix";

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Render the completion script for `shell`
pub fn completion_script(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buf);
    buf
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    std::io::stdout()
        .write_all(&completion_script(args.shell))
        .into_diagnostic()
}
