use clap::Parser;
use miette::Result;
use omnifix::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Diagnose(args) => omnifix::cli::commands::diagnose::run(args, &global),
        Commands::Plan(args) => omnifix::cli::commands::plan::run(args, &global),
        Commands::Scan(args) => omnifix::cli::commands::scan::run(args, &global),
        Commands::Mobile(args) => omnifix::cli::commands::mobile::run(args, &global),
        Commands::Recover(args) => omnifix::cli::commands::recover::run(args, &global),
        Commands::Secure(args) => omnifix::cli::commands::secure::run(args, &global),
        Commands::Library(cmd) => omnifix::cli::commands::library::run(cmd, &global),
        Commands::Catalog(cmd) => omnifix::cli::commands::catalog::run(cmd, &global),
        Commands::Staged(cmd) => omnifix::cli::commands::staged::run(cmd, &global),
        Commands::Config(cmd) => omnifix::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => omnifix::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `OMNIFIX_LOG` overrides the level picked from the flags
fn init_logging(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "omnifix=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_env("OMNIFIX_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
