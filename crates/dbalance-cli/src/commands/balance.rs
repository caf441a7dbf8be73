use clap::{Args, ValueEnum};
use serde_json::Value;

use dbalance_core::builder::{self, Delimiter};
use dbalance_core::report::{self, ReportOptions, SortKey};
use dbalance_core::types::{self, Rate};

use crate::input;

/// Arguments for the holdings report and target allocation
#[derive(Args)]
pub struct BalanceArgs {
    /// Path to the portfolio export (reads stdin when omitted and piped)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Suggest changes for a target yield, in percent (e.g. "5" for 5%)
    #[arg(short, long, value_parser = parse_yield_target)]
    pub yield_target: Option<Rate>,

    /// Field delimiter of the export
    #[arg(short, long, value_enum, default_value = "tab")]
    pub delimiter: DelimiterArg,

    /// Holdings order, largest first
    #[arg(short, long, value_enum, default_value = "yield")]
    pub sort: SortArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DelimiterArg {
    Tab,
    Comma,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Tab => Delimiter::Tab,
            DelimiterArg::Comma => Delimiter::Comma,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Yield,
    MarketValue,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Yield => SortKey::Yield,
            SortArg::MarketValue => SortKey::MarketValue,
        }
    }
}

fn parse_yield_target(s: &str) -> Result<Rate, String> {
    types::parse_percent(s).map_err(|e| e.to_string())
}

pub fn run_balance(args: BalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let delimiter = Delimiter::from(args.delimiter);
    let positions = if let Some(ref path) = args.input {
        builder::read_positions(input::file::open_file(path)?, delimiter)?
    } else if let Some(text) = input::stdin::read_stdin()? {
        builder::read_positions(text.as_bytes(), delimiter)?
    } else {
        return Err("--input <file> or stdin required".into());
    };

    let options = ReportOptions {
        target_yield: args.yield_target,
        sort: args.sort.into(),
    };
    let result = report::build_report(positions, &options)?;
    Ok(serde_json::to_value(result)?)
}
