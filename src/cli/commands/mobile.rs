//! `omnifix mobile` command - Board-level diagnosis for phones and tablets

use console::style;
use miette::Result;

use crate::assistant::{Assistant, MobileDiagnosis};
use crate::cli::commands::utils::{
    completion_client, join_words, load_catalog, note_source, output_format, print_structured,
};
use crate::cli::helpers::escape_tsv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct MobileArgs {
    /// Device model (e.g. "Galaxy A52")
    #[arg(long, short = 'm')]
    pub model: String,

    /// Symptom description
    #[arg(required = true, num_args = 1..)]
    pub symptoms: Vec<String>,
}

/// Run the mobile command
pub fn run(args: MobileArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let assistant = Assistant::new(completion_client(&config, global), &catalog);

    let answer = assistant.mobile_diagnosis(&args.model, &join_words(&args.symptoms));
    note_source(&[answer.source], global);

    let format = output_format(&config, global);
    if print_structured(&answer.value, format)? {
        return Ok(());
    }

    if format == OutputFormat::Tsv {
        print_tsv(&answer.value);
    } else {
        print_text(&args.model, &answer.value);
    }
    Ok(())
}

fn print_tsv(d: &MobileDiagnosis) {
    println!("issue\t{}", escape_tsv(&d.likely_issue));
    println!("focus\t{}", escape_tsv(&d.schematic_focus));
    println!("difficulty\t{}", escape_tsv(&d.difficulty));
    println!("micro_soldering\t{}", d.micro_soldering_required);
    for step in &d.repair_steps {
        println!("step\t{}", escape_tsv(step));
    }
    for tool in &d.required_tools {
        println!("tool\t{}", escape_tsv(tool));
    }
}

fn print_text(model: &str, d: &MobileDiagnosis) {
    println!("{} {}", style("Mobile diagnosis:").bold().underlined(), style(model).cyan());
    println!();
    println!("  {:<16} {}", style("Likely issue:").cyan(), d.likely_issue);
    println!("  {:<16} {}", style("Focus:").cyan(), d.schematic_focus);
    println!("  {:<16} {}", style("Difficulty:").cyan(), d.difficulty);
    let soldering = if d.micro_soldering_required {
        style("required").red().to_string()
    } else {
        style("not required").green().to_string()
    };
    println!("  {:<16} {}", style("Micro-soldering:").cyan(), soldering);
    println!();
    println!("{}", style("Repair steps").bold());
    for (i, step) in d.repair_steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!();
    println!("{}", style("Tools").bold());
    for tool in &d.required_tools {
        println!("  - {}", tool);
    }
}
