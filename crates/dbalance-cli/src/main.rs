mod commands;
mod input;
mod logging;
mod output;

use clap::{ArgAction, Parser, ValueEnum};
use colored::Colorize;
use std::process;

use commands::balance::BalanceArgs;

/// Dividend portfolio balancer
#[derive(Parser)]
#[command(
    name = "dbalance",
    version,
    about = "Report a dividend portfolio and suggest changes for a target yield",
    long_about = "Reads a tab-separated brokerage export of stock positions, reports \
                  market value and value-weighted dividend yield, and with --yield-target \
                  suggests per-position share changes that would move the portfolio to \
                  the target yield."
)]
struct Cli {
    #[command(flatten)]
    balance: BalanceArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Log to stderr; repeat for more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match commands::balance::run_balance(cli.balance) {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
