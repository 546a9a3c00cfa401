pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use autoflex_core::production::CommitPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "autoflex",
    about = "Autoflex operator CLI",
    long_about = "Operate the Autoflex catalog database and inspect production plans.",
    after_help = "Examples:\n  autoflex migrate\n  autoflex seed\n  autoflex plan --ranked --policy per_product"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and verify it landed")]
    Seed,
    #[command(about = "Run the production planner against the current catalog")]
    Plan {
        #[arg(long, help = "Order suggestions by total value, highest first")]
        ranked: bool,
        #[arg(long, help = "Override the configured commit policy (per_line|per_product)")]
        policy: Option<CommitPolicy>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Plan { ranked, policy } => commands::plan::run(commands::plan::PlanOptions {
            ranked,
            policy,
        }),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
