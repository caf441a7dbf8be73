//! Portfolio market value and value-weighted dividend yield.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BalanceError;
use crate::position::Position;
use crate::types::{Money, Rate};
use crate::BalanceResult;

/// Aggregate figures for a (possibly filtered) set of positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Number of positions included.
    pub positions: usize,
    /// Σ quantity × price.
    pub total_value: Money,
    /// Σ market value × yield over dividend payers: expected yearly income.
    pub income: Money,
    /// Value-weighted yield. `None` when `total_value` is zero.
    pub weighted_yield: Option<Rate>,
}

impl PortfolioSummary {
    pub fn monthly_income(&self) -> Money {
        self.income / dec!(12)
    }
}

/// Aggregate every position whose symbol is not `exclude`.
///
/// Positions yielding exactly zero still count toward the total value, so
/// they dilute every other position's weight, but add nothing to the yield.
/// Fails with [`BalanceError::Overflow`] if any sum leaves the `Decimal` range.
pub fn aggregate(positions: &[Position], exclude: Option<&str>) -> BalanceResult<PortfolioSummary> {
    let included = || {
        positions
            .iter()
            .filter(move |p| exclude.map_or(true, |symbol| !p.is_symbol(symbol)))
    };

    let count = included().count();
    let total_value = checked_sum(included().map(Position::market_value), "portfolio value")?;
    let income = checked_sum(included().map(Position::income), "portfolio income")?;

    let weighted_yield = if total_value.is_zero() {
        None
    } else {
        let weighted = included().filter(|p| p.pays_dividend()).map(|p| {
            p.market_value()?
                .checked_div(total_value)?
                .checked_mul(p.dividend_yield)
        });
        Some(checked_sum(weighted, "weighted yield")?)
    };

    Ok(PortfolioSummary {
        positions: count,
        total_value,
        income,
        weighted_yield,
    })
}

fn checked_sum<I>(terms: I, context: &str) -> BalanceResult<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, term| acc.checked_add(term?))
        .ok_or_else(|| BalanceError::overflow(context))
}
