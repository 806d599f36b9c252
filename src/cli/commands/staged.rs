//! `omnifix staged` command - Items staged for the portable kit
//!
//! Staged identifiers persist in the local store between runs. Only items
//! present in the download library can be staged.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::assistant::Assistant;
use crate::cli::commands::utils::{
    completion_client, load_catalog, load_shelf, open_staged, output_format, print_structured,
};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::knowledge::Shelf;

#[derive(Subcommand, Debug)]
pub enum StagedCommands {
    /// List staged identifiers
    List,

    /// Stage one or more library items
    Add(IdsArgs),

    /// Remove one or more identifiers
    Remove(IdsArgs),

    /// Stage a library item if absent, unstage it otherwise
    Toggle(ToggleArgs),

    /// Remove every staged identifier
    Clear,
}

#[derive(clap::Args, Debug)]
pub struct IdsArgs {
    /// Library ids (e.g. iso-hiren)
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ToggleArgs {
    pub id: String,
}

/// Run a staged subcommand
pub fn run(cmd: StagedCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut staged = open_staged(&config)?;

    match cmd {
        StagedCommands::List => {
            if print_structured(&staged.list(), output_format(&config, global))? {
                return Ok(());
            }
            for id in staged.list() {
                println!("{}", id);
            }
            if staged.is_empty() && !global.quiet {
                eprintln!("{}", style("Nothing staged.").dim());
            }
        }
        StagedCommands::Add(args) => {
            let ids = library_ids(&config, global, &args.ids)?;
            for id in &ids {
                if staged.stage(id).into_diagnostic()? {
                    report(global, &format!("Staged {}", style(id).cyan()));
                } else {
                    report(global, &format!("{} already staged", style(id).cyan()));
                }
            }
        }
        StagedCommands::Remove(args) => {
            for id in &args.ids {
                if !staged.unstage(id).into_diagnostic()? {
                    return Err(miette::miette!("'{}' is not staged", id));
                }
                report(global, &format!("Removed {}", style(id).cyan()));
            }
        }
        StagedCommands::Toggle(args) => {
            let id = if staged.contains(&args.id) {
                args.id
            } else {
                library_ids(&config, global, std::slice::from_ref(&args.id))?.remove(0)
            };
            let now_staged = staged.toggle(&id).into_diagnostic()?;
            let verb = if now_staged { "Staged" } else { "Removed" };
            report(global, &format!("{} {}", verb, style(&id).cyan()));
        }
        StagedCommands::Clear => {
            let count = staged.clear().into_diagnostic()?;
            report(global, &format!("Cleared {} item(s)", count));
        }
    }

    Ok(())
}

/// Resolve ids against the library; nothing is staged if any id is unknown
fn library_ids(config: &Config, global: &GlobalOpts, ids: &[String]) -> Result<Vec<String>> {
    let catalog = load_catalog(config)?;
    let assistant = Assistant::new(completion_client(config, global), &catalog);
    let library = assistant.iso_library(load_shelf(Shelf::Iso)?).value;

    ids.iter()
        .map(|id| {
            library.get(id).map(|item| item.id.clone()).ok_or_else(|| {
                miette::miette!(
                    help = "run `omnifix library list` to see available ids",
                    "'{}' is not in the library",
                    id
                )
            })
        })
        .collect()
}

fn report(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}
