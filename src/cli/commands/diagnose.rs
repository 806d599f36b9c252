//! `omnifix diagnose` command - Diagnose a problem description

use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::assistant::Assistant;
use crate::cli::commands::utils::{
    completion_client, join_words, load_catalog, note_source, output_format, print_structured,
};
use crate::cli::helpers::{escape_md, escape_tsv, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::knowledge::{score_entries, Catalog, DiagnosticResult};

#[derive(clap::Args, Debug)]
pub struct DiagnoseArgs {
    /// Problem description (e.g. "el disco aparece como RAW")
    #[arg(required = true, num_args = 1..)]
    pub symptoms: Vec<String>,

    /// Show how each catalog entry scored against the description
    #[arg(long)]
    pub explain: bool,
}

/// Run the diagnose command
pub fn run(args: DiagnoseArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let assistant = Assistant::new(completion_client(&config, global), &catalog);

    let query = join_words(&args.symptoms);
    let answer = assistant.diagnose(&query);
    note_source(&[answer.source], global);

    let format = output_format(&config, global);
    if print_structured(&answer.value, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Tsv => print_tsv(&answer.value),
        OutputFormat::Md => print_md(&answer.value),
        _ => print_text(&answer.value),
    }

    if args.explain && matches!(format, OutputFormat::Text | OutputFormat::Auto | OutputFormat::Md) {
        println!();
        print_scores(&catalog, &query, format);
    }

    Ok(())
}

fn print_text(result: &DiagnosticResult) {
    println!("{}", style("Diagnosis").bold().underlined());
    println!();
    println!("  {:<12} {}", style("Severity:").cyan(), severity_styled(&result.severity));
    println!("  {:<12} {}", style("Difficulty:").cyan(), result.difficulty);
    println!();
    println!("{}", style("Summary").bold());
    println!("  {}", result.summary);
    println!();
    println!("{}", style("Steps").bold());
    for (i, step) in result.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!();
    println!("{}", style("Recommended tools").bold());
    for tool in &result.recommended_tools {
        println!("  - {}", tool);
    }
}

fn print_tsv(result: &DiagnosticResult) {
    println!("severity\t{}", escape_tsv(&result.severity));
    println!("difficulty\t{}", escape_tsv(&result.difficulty));
    println!("summary\t{}", escape_tsv(&result.summary));
    for step in &result.steps {
        println!("step\t{}", escape_tsv(step));
    }
    for tool in &result.recommended_tools {
        println!("tool\t{}", escape_tsv(tool));
    }
}

fn print_md(result: &DiagnosticResult) {
    println!("# Diagnosis\n");
    println!("- **Severity:** {}", escape_md(&result.severity));
    println!("- **Difficulty:** {}\n", escape_md(&result.difficulty));
    println!("{}\n", result.summary);
    println!("## Steps\n");
    for (i, step) in result.steps.iter().enumerate() {
        println!("{}. {}", i + 1, step);
    }
    println!("\n## Recommended tools\n");
    for tool in &result.recommended_tools {
        println!("- {}", tool);
    }
}

fn print_scores(catalog: &Catalog, query: &str, format: OutputFormat) {
    let mut scored = score_entries(catalog, query);
    // Highest first; stable so ties stay in catalog order
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut builder = Builder::default();
    builder.push_record(["ID", "Score", "Danger", "Name"]);
    for s in &scored {
        builder.push_record([
            s.entry.id.clone(),
            s.score.to_string(),
            s.entry.danger_level.to_string(),
            truncate_str(&s.entry.name, 45),
        ]);
    }

    let mut table = builder.build();
    if format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    println!("{}", table);
}

fn severity_styled(severity: &str) -> console::StyledObject<&str> {
    match severity {
        "Critical" => style(severity).red().bold(),
        "High" => style(severity).red(),
        "Medium" => style(severity).yellow(),
        "Low" => style(severity).green(),
        _ => style(severity).dim(),
    }
}
