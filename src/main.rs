use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use crypto_analyzer::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Keep records in memory only; price files are re-read on every run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for crypto_analyzer::AppCommand {
    fn from(cmd: Commands) -> crypto_analyzer::AppCommand {
        use crypto_analyzer::AppCommand;
        match cmd {
            Commands::Stats { currency_code } => AppCommand::Stats { currency_code },
            Commands::Normalized => AppCommand::Normalized,
            Commands::Highest { day, month, year } => AppCommand::Highest { day, month, year },
            Commands::Import { file } => AppCommand::Import { file },
            Commands::Serve => AppCommand::Serve,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show min, max, oldest and newest prices for a currency
    Stats {
        /// Currency code, e.g. BTC
        currency_code: String,
    },
    /// Rank all currencies by normalized range
    Normalized,
    /// Show the currency with the highest normalized range on a day
    Highest {
        #[arg(long)]
        day: u32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },
    /// Add records from a `timestamp,currencyCode,price` CSV file
    Import { file: PathBuf },
    /// Serve the statistics over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => crypto_analyzer::cli::setup::setup(),
        Some(cmd) => {
            crypto_analyzer::run_command(cmd.into(), cli.config_path.as_deref(), cli.ephemeral)
                .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
