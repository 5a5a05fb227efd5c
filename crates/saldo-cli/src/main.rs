use anyhow::Result;
use clap::{Parser, Subcommand};
use saldo_cli::commands;
use saldo_cli::commands::run::RunArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "saldo")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Watch an account balance on a platform with no public API",
    long_about = "Saldo drives an authenticated headless-Chrome session to the platform's \
                  account page, extracts the balance through a chain of fallback strategies, \
                  prepends the observation to a markdown journal, and best-effort publishes \
                  the journal with git."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Take one balance observation and record it
    Run(RunArgs),

    /// Show the most recent journal sections
    Journal {
        /// Path to the journal file
        #[arg(long, default_value = "BALANCE.md")]
        path: PathBuf,

        /// Number of sections to show
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Journal { path, count } => commands::journal::execute(&path, count),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("saldo=debug,saldo_core=debug,saldo_browser=debug")
    } else {
        EnvFilter::new("saldo=info,saldo_core=info,saldo_browser=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
