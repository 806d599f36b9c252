//! `omnifix library` command - ISO images, installers and mobile firmware

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::assistant::{Assistant, InstallManual};
use crate::cli::commands::utils::{
    completion_client, join_words, load_catalog, load_shelf, note_source, open_staged,
    output_format, print_structured,
};
use crate::cli::helpers::{escape_md, escape_tsv, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::knowledge::{LibraryItem, Shelf};

#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// List ISO images and installers that can be staged
    List(ListArgs),

    /// List mobile firmware images
    Firmware,

    /// Installation guide for a library item or any named image
    Manual(ManualArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only items of this type (Windows, Rescue, Software...)
    #[arg(long = "type", short = 't')]
    pub kind: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ManualArgs {
    /// Library id (e.g. iso-hiren) or image name
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
}

/// Run a library subcommand
pub fn run(cmd: LibraryCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let assistant = Assistant::new(completion_client(&config, global), &catalog);
    let format = output_format(&config, global);

    match cmd {
        LibraryCommands::List(args) => {
            let answer = assistant.iso_library(load_shelf(Shelf::Iso)?);
            note_source(&[answer.source], global);

            let items: Vec<&LibraryItem> = match &args.kind {
                Some(kind) => answer.value.of_kind(kind).collect(),
                None => answer.value.iter().collect(),
            };
            // Marks are best effort; listing works without a data directory
            let staged: Vec<String> = open_staged(&config)
                .map(|s| s.list().to_vec())
                .unwrap_or_default();
            print_items(&items, &staged, format, global)
        }
        LibraryCommands::Firmware => {
            let answer = assistant.firmware_library(load_shelf(Shelf::Firmware)?);
            note_source(&[answer.source], global);
            let items: Vec<&LibraryItem> = answer.value.iter().collect();
            print_items(&items, &[], format, global)
        }
        LibraryCommands::Manual(args) => {
            let query = join_words(&args.name);
            let library = load_shelf(Shelf::Iso)?;
            let name = library
                .get(&query)
                .map(|item| item.name.clone())
                .unwrap_or(query);

            let answer = assistant.installation_manual(&name);
            note_source(&[answer.source], global);
            if print_structured(&answer.value, format)? {
                return Ok(());
            }
            print_manual(&name, &answer.value);
            Ok(())
        }
    }
}

fn print_items(
    items: &[&LibraryItem],
    staged: &[String],
    format: OutputFormat,
    global: &GlobalOpts,
) -> Result<()> {
    if print_structured(&items, format)? {
        return Ok(());
    }
    let is_staged = |item: &LibraryItem| staged.iter().any(|id| id == &item.id);

    match format {
        OutputFormat::Tsv => {
            for item in items {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    item.id,
                    escape_tsv(&item.kind),
                    escape_tsv(&item.version),
                    escape_tsv(&item.size),
                    escape_tsv(&item.name),
                    item.download_url.as_deref().unwrap_or("")
                );
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["ID", "Type", "Version", "Size", "Name"]);
            for item in items {
                builder.push_record([
                    item.id.clone(),
                    escape_md(&item.kind),
                    escape_md(&item.version),
                    escape_md(&item.size),
                    escape_md(&item.name),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        _ => {
            if items.is_empty() {
                println!("No library items match.");
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["", "ID", "TYPE", "VERSION", "SIZE", "NAME"]);
            for item in items {
                let mark = if is_staged(*item) { "✓" } else { "" };
                builder.push_record([
                    mark.to_string(),
                    item.id.clone(),
                    item.kind.clone(),
                    truncate_str(&item.version, 14),
                    item.size.clone(),
                    truncate_str(&item.name, 32),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            if !global.quiet {
                println!();
                println!("{} item(s)", style(items.len()).cyan());
            }
        }
    }

    Ok(())
}

fn print_manual(name: &str, manual: &InstallManual) {
    println!("{}", style(&manual.title).bold().underlined());
    println!("  {}", style(name).dim());
    println!();
    for (i, step) in manual.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, style(&step.step).bold());
        if !step.details.is_empty() {
            println!("     {}", step.details);
        }
    }
    if !manual.technical_tips.is_empty() {
        println!();
        println!("{}", style("Tips").bold());
        for tip in &manual.technical_tips {
            println!("  - {}", tip);
        }
    }
}
