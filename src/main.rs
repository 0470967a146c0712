use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use ratewatch::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct PairArgs {
    /// Base currency, e.g. USD
    #[arg(long)]
    from: Option<String>,

    /// Quote currency, e.g. RUB
    #[arg(long)]
    to: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Poll the exchange rate until it crosses the target rate
    Watch {
        /// Rate the watch starts from; decides whether the target is reached
        /// by falling or rising
        start_rate: String,

        /// Rate that ends the watch once reached or passed
        target_rate: String,

        #[command(flatten)]
        pair: PairArgs,

        /// Milliseconds between rate checks
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Number of rate checks before giving up
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// Display the current exchange rate
    Rate {
        #[command(flatten)]
        pair: PairArgs,
    },
}

impl From<Commands> for ratewatch::AppCommand {
    fn from(cmd: Commands) -> ratewatch::AppCommand {
        match cmd {
            Commands::Watch {
                start_rate,
                target_rate,
                pair,
                interval_ms,
                max_attempts,
            } => ratewatch::AppCommand::Watch {
                start_rate,
                target_rate,
                overrides: ratewatch::Overrides {
                    from: pair.from,
                    to: pair.to,
                    interval_ms,
                    max_attempts,
                },
            },
            Commands::Rate { pair } => ratewatch::AppCommand::Rate {
                overrides: ratewatch::Overrides {
                    from: pair.from,
                    to: pair.to,
                    ..Default::default()
                },
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ratewatch::cli::setup::setup(),
        Some(cmd) => ratewatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
