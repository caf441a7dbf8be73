use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BalanceError;
use crate::BalanceResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Whole share counts. Negative values are short positions.
pub type Shares = i64;

/// Convert a rate to its percentage form (0.05 -> 5). `None` on overflow.
pub fn rate_to_pct(rate: Rate) -> Option<Decimal> {
    rate.checked_mul(dec!(100))
}

/// Convert a percentage to a rate (5 -> 0.05).
pub fn pct_to_rate(pct: Decimal) -> Rate {
    pct / dec!(100)
}

/// Parse a user-supplied percentage such as `"5"` or `"4.25%"` into a rate.
///
/// Unlike the export field parsers this is strict: a target the user typed
/// should never silently become zero.
pub fn parse_percent(text: &str) -> BalanceResult<Rate> {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let pct = Decimal::from_str(digits).map_err(|e| BalanceError::InvalidInput {
        field: "yield_target".into(),
        reason: format!("'{}' is not a percentage ({})", text, e),
    })?;
    Ok(pct_to_rate(pct))
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
///
/// Carries no timing fields: identical input must render byte-identical output.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
