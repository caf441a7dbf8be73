use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt::Write;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify};
use tabled::Table;

use super::{as_decimal, plain, result_of};

/// Print the holdings report as tables.
pub fn print_table(value: &Value) {
    print!("{}", render_report(value));
}

/// Render the holdings, summary and target sections, then any warnings.
pub fn render_report(value: &Value) -> String {
    let result = result_of(value);
    let mut out = String::new();

    if let Some(Value::Array(holdings)) = result.get("holdings") {
        let _ = writeln!(out, "Current portfolio:\n");
        let _ = writeln!(out, "{}", holdings_table(holdings));
    }

    if let Some(summary @ Value::Object(_)) = result.get("summary") {
        let _ = writeln!(out, "{}", summary_table(summary));
    }

    if let Some(target @ Value::Object(_)) = result.get("target") {
        let pct = as_decimal(target.get("target_yield_pct"))
            .map(|p| format!("{:.3}%", p))
            .unwrap_or_else(|| "n/a".into());
        let _ = writeln!(
            out,
            "\nFor a target yield of {}, we can make the following changes:\n",
            pct
        );
        match target.get("changes") {
            Some(Value::Array(changes)) if !changes.is_empty() => {
                let _ = writeln!(out, "{}", changes_table(changes));
            }
            _ => {
                let _ = writeln!(out, "(no changes)");
            }
        }
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            let _ = writeln!(out, "\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    let _ = writeln!(out, "  - {}", s);
                }
            }
        }
    }

    out
}

fn holdings_table(holdings: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Symbol", "Qty", "Price", "Yield", "Mkt. Value"]);
    for h in holdings {
        builder.push_record([
            h.get("symbol").map(plain).unwrap_or_default(),
            h.get("quantity").map(plain).unwrap_or_default(),
            money(h.get("price")),
            percent(h.get("yield_pct"), 2),
            money(h.get("market_value")),
        ]);
    }
    right_align_numbers(builder.build())
}

fn summary_table(summary: &Value) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Portfolio", "Value"]);
    builder.push_record([
        "Positions".to_string(),
        summary.get("positions").map(plain).unwrap_or_default(),
    ]);
    builder.push_record(["Value".to_string(), money(summary.get("portfolio_value"))]);
    builder.push_record([
        "Yield".to_string(),
        percent(summary.get("portfolio_yield_pct"), 3),
    ]);
    builder.push_record([
        "Expected income".to_string(),
        format!(
            "{} per year, or {} per month",
            money(summary.get("yearly_income")),
            money(summary.get("monthly_income"))
        ),
    ]);
    builder.build()
}

fn changes_table(changes: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Symbol", "Qty", "Investment"]);
    for c in changes {
        builder.push_record([
            c.get("symbol").map(plain).unwrap_or_default(),
            c.get("change_quantity").map(plain).unwrap_or_default(),
            money(c.get("investment")),
        ]);
    }
    right_align_numbers(builder.build())
}

fn right_align_numbers(mut table: Table) -> Table {
    table.with(Modify::new(Columns::new(1..)).with(Alignment::right()));
    table
}

fn money(value: Option<&Value>) -> String {
    as_decimal(value)
        .map(format_money)
        .unwrap_or_else(|| "n/a".into())
}

fn percent(value: Option<&Value>, dp: usize) -> String {
    as_decimal(value)
        .map(|p| format!("{:.*}%", dp, p))
        .unwrap_or_else(|| "undefined".into())
}

/// `$1,234.56`, with a leading minus for negative amounts.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
