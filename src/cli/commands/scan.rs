//! `omnifix scan` command - Analyze a system profile and plan repairs
//!
//! The profile is a JSON document (camelCase keys) as produced by the
//! collector: `cpuName`, `ramTotal`, `diskHealth`, `osVersion`,
//! `activeProcesses`, `recentErrors`.

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::assistant::{Assistant, HealthReport, SystemProfile};
use crate::cli::commands::plan::print_tasks;
use crate::cli::commands::utils::{
    completion_client, load_catalog, note_source, output_format, print_structured,
};
use crate::cli::helpers::escape_tsv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::knowledge::RepairTask;

#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// Profile JSON file ("-" reads stdin)
    pub profile: PathBuf,
}

#[derive(Serialize)]
struct ScanReport<'a> {
    health: &'a HealthReport,
    plan: &'a [RepairTask],
}

/// Run the scan command
pub fn run(args: ScanArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let assistant = Assistant::new(completion_client(&config, global), &catalog);

    let profile = read_profile(&args.profile)?;
    let health = assistant.analyze_profile(&profile);
    let plan = assistant.repair_plan(&health.value.risks);
    note_source(&[health.source, plan.source], global);

    let format = output_format(&config, global);
    let report = ScanReport {
        health: &health.value,
        plan: &plan.value,
    };
    if print_structured(&report, format)? {
        return Ok(());
    }

    if format == OutputFormat::Tsv {
        println!("score\t{}", health.value.health_score);
        for risk in &health.value.risks {
            println!("risk\t{}", escape_tsv(risk));
        }
        for task in &plan.value {
            println!(
                "task\t{}\t{}\t{}",
                task.id,
                escape_tsv(&task.title),
                escape_tsv(&task.command)
            );
        }
        return Ok(());
    }

    print_health(&health.value);
    println!();
    print_tasks(&plan.value, format)
}

fn read_profile(path: &Path) -> Result<SystemProfile> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        buf
    } else {
        std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read profile {}", path.display()))?
    };

    serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err("Profile is not valid JSON")
}

fn print_health(report: &HealthReport) {
    let score = report.health_score;
    let score_styled = if score >= 80 {
        style(score).green()
    } else if score >= 60 {
        style(score).yellow()
    } else {
        style(score).red()
    };

    println!("{}", style("System health").bold().underlined());
    println!();
    println!("  {} {}/100", style("Score:").cyan(), score_styled);
    println!("  {}", report.summary);
    println!();
    println!("{}", style("Risks").bold());
    for risk in &report.risks {
        println!("  - {}", risk);
    }
}
