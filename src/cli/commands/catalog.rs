//! `omnifix catalog` command - Browse the local knowledge catalog

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{load_catalog, output_format, print_structured};
use crate::cli::helpers::{escape_md, escape_tsv, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::knowledge::{Category, DangerLevel, KnowledgeEntry};

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List catalog entries
    List(ListArgs),

    /// Show one entry in full
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only entries in this category
    #[arg(long, short = 'c')]
    pub category: Option<Category>,

    /// Only entries at or above this danger level
    #[arg(long, short = 'd')]
    pub min_danger: Option<DangerLevel>,

    /// Only entries carrying this tag
    #[arg(long, short = 't')]
    pub tag: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Entry id (e.g. st-03)
    pub id: String,
}

/// Run a catalog subcommand
pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatalogCommands::List(args) => run_list(args, global),
        CatalogCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;

    let entries: Vec<&KnowledgeEntry> = catalog
        .iter()
        .filter(|e| args.category.map_or(true, |c| e.category == c))
        .filter(|e| args.min_danger.map_or(true, |d| e.danger_level >= d))
        .filter(|e| {
            args.tag
                .as_ref()
                .map_or(true, |t| e.tags.iter().any(|tag| tag.eq_ignore_ascii_case(t)))
        })
        .collect();

    let format = output_format(&config, global);
    if print_structured(&entries, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Tsv => {
            for e in &entries {
                println!(
                    "{}\t{}\t{}\t{}",
                    e.id,
                    e.category,
                    e.danger_level,
                    escape_tsv(&e.name)
                );
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["ID", "Category", "Danger", "Name"]);
            for e in &entries {
                builder.push_record([
                    e.id.clone(),
                    e.category.to_string(),
                    e.danger_level.to_string(),
                    escape_md(&e.name),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        _ => {
            if entries.is_empty() {
                println!("No catalog entries match.");
                return Ok(());
            }
            println!(
                "{:<8} {:<10} {:<9} {}",
                style("ID").bold(),
                style("CATEGORY").bold(),
                style("DANGER").bold(),
                style("NAME").bold()
            );
            println!("{}", "-".repeat(72));
            for e in &entries {
                println!(
                    "{:<8} {:<10} {:<9} {}",
                    style(&e.id).cyan(),
                    e.category.to_string(),
                    danger_styled(e.danger_level),
                    truncate_str(&e.name, 45)
                );
            }
            if !global.quiet {
                println!();
                println!("{} entry(ies)", style(entries.len()).cyan());
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;

    let entry = catalog
        .get(&args.id)
        .ok_or_else(|| miette::miette!("No catalog entry with id '{}'", args.id))?;

    let format = output_format(&config, global);
    if print_structured(entry, format)? {
        return Ok(());
    }

    println!("{} {}", style(&entry.id).cyan(), style(&entry.name).bold());
    println!(
        "  {} {}   {} {}",
        style("Category:").dim(),
        entry.category,
        style("Danger:").dim(),
        danger_styled(entry.danger_level)
    );
    println!();
    println!("  {}", entry.description);

    if !entry.symptom_examples.is_empty() {
        println!();
        println!("{}", style("Symptoms").bold());
        for s in &entry.symptom_examples {
            println!("  - {}", s);
        }
    }

    println!();
    println!("{}", style("Remediation").bold());
    for (i, step) in entry.remediation_steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }

    println!();
    println!("{}", style("Commands").bold());
    if entry.terminal_commands.is_empty() {
        println!("  {} {}", style("$").dim(), style(entry.primary_command()).cyan());
    }
    for cmd in &entry.terminal_commands {
        println!("  {} {}", style("$").dim(), style(cmd).cyan());
    }

    if !entry.tags.is_empty() {
        println!();
        println!("{} {}", style("Tags:").dim(), entry.tags.join(", "));
    }

    Ok(())
}

fn danger_styled(level: DangerLevel) -> console::StyledObject<String> {
    let text = level.to_string();
    match level {
        DangerLevel::Critical => style(text).red().bold(),
        DangerLevel::High => style(text).red(),
        DangerLevel::Medium => style(text).yellow(),
        DangerLevel::Low => style(text).green(),
    }
}
