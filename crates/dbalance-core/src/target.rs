//! Target-yield allocation solver.
//!
//! For a position P and a target yield y_t, holding every other position
//! fixed, the market value V_P that brings the whole portfolio to y_t
//! satisfies
//!
//! ```text
//! y_t · (V_excl + V_P) = Y_excl · V_excl + yield_P · V_P
//! V_P = (y_t · V_excl − V_excl · Y_excl) / (yield_P − y_t)
//! ```
//!
//! where `V_excl` and `Y_excl` are the value and weighted yield of the
//! portfolio without P. `V_excl · Y_excl` is the excluded portfolio's income,
//! which stays defined when `V_excl` is zero.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::position::Position;
use crate::types::{Money, Rate, Shares};

/// Suggested change to one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAllocation {
    pub symbol: String,
    /// Market value the position must reach.
    pub target_value: Money,
    /// Whole shares at the current price, truncated toward zero.
    pub target_shares: Shares,
    /// `target_shares − quantity`.
    pub change_quantity: Shares,
    /// `target_value − current market value`.
    pub investment_amount: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfeasibleReason {
    /// The position already yields the target; no finite size moves the portfolio.
    YieldEqualsTarget,
    /// A zero price makes the share count undefined.
    ZeroPrice,
    /// The share count, target value or a portfolio sum overflows.
    OutOfRange,
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfeasibleReason::YieldEqualsTarget => write!(f, "dividend yield equals the target"),
            InfeasibleReason::ZeroPrice => write!(f, "price is zero"),
            InfeasibleReason::OutOfRange => write!(f, "target size is out of range"),
        }
    }
}

/// Result of solving for one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TargetOutcome {
    /// A non-zero change that leaves the position non-negative.
    Recommend(TargetAllocation),
    /// The position is already at its target size.
    Unchanged(TargetAllocation),
    /// Reaching the target would need a short position.
    WouldGoShort(TargetAllocation),
    Infeasible(InfeasibleReason),
}

impl TargetOutcome {
    pub fn recommendation(&self) -> Option<&TargetAllocation> {
        match self {
            TargetOutcome::Recommend(allocation) => Some(allocation),
            _ => None,
        }
    }
}

/// Solve for the size of `position` that brings `positions` to `target_yield`.
///
/// Every position sharing `position.symbol` is left out of the rest of the
/// portfolio.
pub fn solve_target(positions: &[Position], position: &Position, target_yield: Rate) -> TargetOutcome {
    let Some(spread) = position.dividend_yield.checked_sub(target_yield) else {
        return TargetOutcome::Infeasible(InfeasibleReason::OutOfRange);
    };
    if spread.is_zero() {
        return TargetOutcome::Infeasible(InfeasibleReason::YieldEqualsTarget);
    }
    if position.price.is_zero() {
        return TargetOutcome::Infeasible(InfeasibleReason::ZeroPrice);
    }

    let Ok(rest) = aggregate(positions, Some(&position.symbol)) else {
        return TargetOutcome::Infeasible(InfeasibleReason::OutOfRange);
    };
    let Some(target_value) = target_yield
        .checked_mul(rest.total_value)
        .and_then(|required_income| required_income.checked_sub(rest.income))
        .and_then(|shortfall| shortfall.checked_div(spread))
    else {
        return TargetOutcome::Infeasible(InfeasibleReason::OutOfRange);
    };
    let Some(target_shares) = target_value
        .checked_div(position.price)
        .and_then(|shares| shares.trunc().to_i64())
    else {
        return TargetOutcome::Infeasible(InfeasibleReason::OutOfRange);
    };
    let Some(investment_amount) = position
        .market_value()
        .and_then(|current| target_value.checked_sub(current))
    else {
        return TargetOutcome::Infeasible(InfeasibleReason::OutOfRange);
    };

    let change_quantity = target_shares.saturating_sub(position.quantity);
    let allocation = TargetAllocation {
        symbol: position.symbol.clone(),
        target_value,
        target_shares,
        change_quantity,
        investment_amount,
    };

    if change_quantity == 0 {
        TargetOutcome::Unchanged(allocation)
    } else if position.quantity.saturating_add(change_quantity) < 0 {
        TargetOutcome::WouldGoShort(allocation)
    } else {
        TargetOutcome::Recommend(allocation)
    }
}

/// Solve every position in order. Quadratic in the number of positions.
pub fn plan_targets(positions: &[Position], target_yield: Rate) -> Vec<(String, TargetOutcome)> {
    positions
        .iter()
        .map(|position| {
            let outcome = solve_target(positions, position, target_yield);
            tracing::debug!(symbol = %position.symbol, ?outcome, "solved target allocation");
            (position.symbol.clone(), outcome)
        })
        .collect()
}
