use serde_json::Value;

use super::{plain, result_of};

/// Print just the portfolio yield, in percent.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    match result_of(value)
        .get("summary")
        .and_then(|summary| summary.get("portfolio_yield_pct"))
    {
        Some(Value::Null) | None => "undefined".to_string(),
        Some(pct) => plain(pct),
    }
}
