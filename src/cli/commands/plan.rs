//! `omnifix plan` command - Build a repair plan from risk labels

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::assistant::Assistant;
use crate::cli::commands::utils::{
    completion_client, load_catalog, note_source, output_format, print_structured,
};
use crate::cli::helpers::{escape_md, escape_tsv, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::knowledge::{render_batch_script, RepairTask};

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    /// Risk labels, one per argument (e.g. "disco sin letra" "bsod")
    pub risks: Vec<String>,

    /// Print the plan as a Windows batch script
    #[arg(long)]
    pub script: bool,

    /// Write the batch script to this file instead of stdout
    #[arg(long, short = 'o', requires = "script")]
    pub output: Option<PathBuf>,
}

/// Run the plan command
pub fn run(args: PlanArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let assistant = Assistant::new(completion_client(&config, global), &catalog);

    let answer = assistant.repair_plan(&args.risks);
    note_source(&[answer.source], global);

    if args.script {
        let script = render_batch_script(&answer.value);
        match args.output {
            Some(path) => {
                fs::write(&path, script).into_diagnostic()?;
                if !global.quiet {
                    println!(
                        "{} Wrote {} task(s) to {}",
                        style("✓").green(),
                        answer.value.len(),
                        style(path.display()).cyan()
                    );
                }
            }
            None => print!("{}", script),
        }
        return Ok(());
    }

    print_tasks(&answer.value, output_format(&config, global))
}

/// Print repair tasks in the requested format
pub fn print_tasks(tasks: &[RepairTask], format: OutputFormat) -> Result<()> {
    if print_structured(&tasks, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Tsv => {
            for task in tasks {
                println!(
                    "{}\t{}\t{}\t{}",
                    task.id,
                    escape_tsv(&task.title),
                    escape_tsv(&task.command),
                    escape_tsv(&task.description)
                );
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["ID", "Title", "Command", "Description"]);
            for task in tasks {
                builder.push_record([
                    task.id.clone(),
                    escape_md(&task.title),
                    format!("`{}`", task.command),
                    escape_md(&task.description),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        _ => {
            println!("{}", style("Repair plan").bold().underlined());
            println!();
            for (i, task) in tasks.iter().enumerate() {
                println!(
                    "{:>3}. {} {}",
                    i + 1,
                    style(truncate_str(&task.title, 60)).bold(),
                    style(format!("[{}]", task.id)).dim()
                );
                println!("     {} {}", style("$").dim(), style(&task.command).cyan());
                println!("     {}", task.description);
            }
            println!();
            println!("{} task(s)", style(tasks.len()).cyan());
        }
    }

    Ok(())
}
