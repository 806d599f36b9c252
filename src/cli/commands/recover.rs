//! `omnifix recover` command - Data recovery advice

use console::style;
use miette::Result;

use crate::assistant::{Assistant, RecoveryAdvice};
use crate::cli::commands::utils::{
    completion_client, join_words, load_catalog, note_source, output_format, print_structured,
};
use crate::cli::helpers::escape_tsv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct RecoverArgs {
    /// Kind of files lost (e.g. fotos, documentos)
    pub file_type: String,

    /// How they were lost (e.g. "formateo accidental")
    #[arg(required = true, num_args = 1..)]
    pub scenario: Vec<String>,
}

/// Run the recover command
pub fn run(args: RecoverArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let assistant = Assistant::new(completion_client(&config, global), &catalog);

    let answer = assistant.recovery_advice(&args.file_type, &join_words(&args.scenario));
    note_source(&[answer.source], global);

    let format = output_format(&config, global);
    if print_structured(&answer.value, format)? {
        return Ok(());
    }

    if format == OutputFormat::Tsv {
        print_tsv(&answer.value);
    } else {
        print_text(&args.file_type, &answer.value);
    }
    Ok(())
}

fn print_tsv(advice: &RecoveryAdvice) {
    println!("chance\t{}", escape_tsv(&advice.chance));
    println!("tool\t{}", escape_tsv(&advice.tool));
    for step in &advice.steps {
        println!("step\t{}", escape_tsv(step));
    }
}

fn print_text(file_type: &str, advice: &RecoveryAdvice) {
    println!(
        "{} {}",
        style("Recovery:").bold().underlined(),
        style(file_type).cyan()
    );
    println!();
    println!("  {:<8} {}", style("Chance:").cyan(), advice.chance);
    println!("  {:<8} {}", style("Tools:").cyan(), advice.tool);
    println!();
    println!("{}", style("Steps").bold());
    for (i, step) in advice.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}
