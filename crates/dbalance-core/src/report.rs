//! Assembles the holdings report and, when a target is set, the target
//! allocation section.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, PortfolioSummary};
use crate::error::BalanceError;
use crate::position::Position;
use crate::target::{plan_targets, TargetOutcome};
use crate::types::*;
use crate::BalanceResult;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Ordering of the holdings table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Highest dividend yield first.
    #[default]
    Yield,
    /// Largest market value first.
    MarketValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Target portfolio yield as a fraction. Enables the target section.
    pub target_yield: Option<Rate>,
    pub sort: SortKey,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingLine {
    pub symbol: String,
    pub quantity: Shares,
    pub price: Money,
    pub yield_pct: Decimal,
    pub market_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub positions: usize,
    pub portfolio_value: Money,
    /// `None` when the portfolio has no market value.
    pub portfolio_yield_pct: Option<Decimal>,
    pub yearly_income: Money,
    pub monthly_income: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLine {
    pub symbol: String,
    pub change_quantity: Shares,
    pub investment: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSection {
    pub target_yield_pct: Decimal,
    pub changes: Vec<TargetLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub holdings: Vec<HoldingLine>,
    pub summary: SummaryLine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetSection>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Stable sort by `key`, largest first. Ties keep input order.
pub fn sort_positions(positions: &mut [Position], key: SortKey) {
    match key {
        SortKey::Yield => positions.sort_by(|l, r| r.dividend_yield.cmp(&l.dividend_yield)),
        // Overflowing values (None) sort last.
        SortKey::MarketValue => positions.sort_by(|l, r| r.market_value().cmp(&l.market_value())),
    }
}

/// Build the full report from the positions of one export.
///
/// Fails with [`BalanceError::Overflow`] when the portfolio totals do not fit
/// a `Decimal`; per-position target overflows only produce warnings.
pub fn build_report(
    mut positions: Vec<Position>,
    options: &ReportOptions,
) -> BalanceResult<ComputationOutput<BalanceReport>> {
    let mut warnings: Vec<String> = Vec::new();

    let portfolio = aggregate(&positions, None).inspect_err(|e| {
        tracing::warn!(error = %e, "portfolio totals overflowed");
    })?;
    if portfolio.weighted_yield.is_none() {
        tracing::warn!(positions = portfolio.positions, "portfolio has zero market value");
        warnings.push("Portfolio has zero market value; yield is undefined".into());
    }

    sort_positions(&mut positions, options.sort);

    let holdings = positions
        .iter()
        .map(holding_line)
        .collect::<BalanceResult<Vec<_>>>()?;
    let summary = summary_line(&portfolio)?;
    let target = options
        .target_yield
        .map(|target_yield| target_section(&positions, target_yield, &mut warnings))
        .transpose()?;

    let report = BalanceReport {
        holdings,
        summary,
        target,
    };

    Ok(with_metadata(
        "Value-weighted dividend yield; closed-form per-position target sizing",
        options,
        warnings,
        report,
    ))
}

fn holding_line(position: &Position) -> BalanceResult<HoldingLine> {
    Ok(HoldingLine {
        symbol: position.symbol.clone(),
        quantity: position.quantity,
        price: position.price,
        yield_pct: rate_to_pct(position.dividend_yield)
            .ok_or_else(|| BalanceError::overflow(format!("{} yield", position.symbol)))?,
        market_value: position
            .market_value()
            .ok_or_else(|| BalanceError::overflow(format!("{} market value", position.symbol)))?,
    })
}

fn summary_line(portfolio: &PortfolioSummary) -> BalanceResult<SummaryLine> {
    let portfolio_yield_pct = match portfolio.weighted_yield {
        Some(y) => Some(rate_to_pct(y).ok_or_else(|| BalanceError::overflow("portfolio yield"))?),
        None => None,
    };
    Ok(SummaryLine {
        positions: portfolio.positions,
        portfolio_value: portfolio.total_value,
        portfolio_yield_pct,
        yearly_income: portfolio.income,
        monthly_income: portfolio.monthly_income(),
    })
}

fn target_section(
    positions: &[Position],
    target_yield: Rate,
    warnings: &mut Vec<String>,
) -> BalanceResult<TargetSection> {
    let mut changes = Vec::new();

    for (symbol, outcome) in plan_targets(positions, target_yield) {
        match outcome {
            TargetOutcome::Recommend(allocation) => changes.push(TargetLine {
                symbol,
                change_quantity: allocation.change_quantity,
                investment: allocation.investment_amount,
            }),
            TargetOutcome::Unchanged(_) => {}
            TargetOutcome::WouldGoShort(allocation) => {
                warnings.push(format!(
                    "{}: target requires {} shares; no change suggested",
                    symbol, allocation.target_shares
                ));
            }
            TargetOutcome::Infeasible(reason) => {
                tracing::warn!(%symbol, %reason, "no finite target allocation");
                warnings.push(format!("{}: no feasible target allocation ({})", symbol, reason));
            }
        }
    }

    Ok(TargetSection {
        target_yield_pct: rate_to_pct(target_yield)
            .ok_or_else(|| BalanceError::overflow("target yield"))?,
        changes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pos(symbol: &str, quantity: Shares, price: Money, dividend_yield: Rate) -> Position {
        Position {
            symbol: symbol.into(),
            quantity,
            price,
            dividend_yield,
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_by_yield_is_stable() {
        let mut positions = vec![
            pos("LOW", 1, dec!(1), dec!(0.01)),
            pos("TIE1", 1, dec!(1), dec!(0.03)),
            pos("HIGH", 1, dec!(1), dec!(0.05)),
            pos("TIE2", 1, dec!(1), dec!(0.03)),
        ];
        sort_positions(&mut positions, SortKey::Yield);
        let order: Vec<&str> = positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "TIE1", "TIE2", "LOW"]);
    }

    #[test]
    fn test_sort_by_market_value() {
        let mut positions = vec![
            pos("SMALL", 1, dec!(5), dec!(0.05)),
            pos("BIG", 100, dec!(5), dec!(0.01)),
        ];
        sort_positions(&mut positions, SortKey::MarketValue);
        assert_eq!(positions[0].symbol, "BIG");
    }

    #[test]
    fn test_report_without_target() {
        let positions = vec![
            pos("B", 50, dec!(20), dec!(0.02)),
            pos("A", 100, dec!(10), dec!(0.04)),
        ];
        let out = build_report(positions, &ReportOptions::default()).unwrap();
        let report = out.result;
        assert_eq!(report.holdings[0].symbol, "A");
        assert_eq!(report.holdings[0].yield_pct, dec!(4));
        assert_eq!(report.summary.portfolio_value, dec!(2000));
        assert_eq!(report.summary.portfolio_yield_pct, Some(dec!(3)));
        assert_eq!(report.summary.yearly_income, dec!(60));
        assert_eq!(report.summary.monthly_income, dec!(5));
        assert!(report.target.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_report_with_target_lists_only_feasible_changes() {
        let positions = vec![
            pos("A", 100, dec!(10), dec!(0.04)),
            pos("B", 50, dec!(20), dec!(0.02)),
        ];
        let options = ReportOptions {
            target_yield: Some(dec!(0.03)),
            ..Default::default()
        };
        let report = build_report(positions, &options).unwrap().result;
        let target = report.target.expect("target section");
        assert_eq!(target.target_yield_pct, dec!(3));
        // both positions already balance the portfolio at 3%
        assert!(target.changes.is_empty());
    }

    #[test]
    fn test_infeasible_positions_are_warned() {
        let positions = vec![
            pos("A", 100, dec!(10), dec!(0.04)),
            pos("B", 50, dec!(20), dec!(0.02)),
        ];
        let options = ReportOptions {
            target_yield: Some(dec!(0.04)),
            ..Default::default()
        };
        let out = build_report(positions, &options).unwrap();
        assert!(out.warnings.iter().any(|w| w.starts_with("A: no feasible")));
    }

    #[test]
    fn test_empty_portfolio_warns_undefined_yield() {
        let out = build_report(Vec::new(), &ReportOptions::default()).unwrap();
        assert_eq!(out.result.summary.positions, 0);
        assert_eq!(out.result.summary.portfolio_yield_pct, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_saturated_quantity_is_an_overflow_error() {
        let positions = vec![
            pos("A", 100, dec!(10), dec!(0.04)),
            pos("BIG", Shares::MAX, dec!(10000000000), dec!(0.03)),
        ];
        let err = build_report(positions, &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, BalanceError::Overflow { .. }));
    }

    #[test]
    fn test_overflowing_income_is_an_overflow_error() {
        let positions = vec![pos("X", 1_000_000_000, dec!(1000000000000000000), dec!(10000000000))];
        let options = ReportOptions {
            target_yield: Some(dec!(0.05)),
            ..Default::default()
        };
        assert!(matches!(
            build_report(positions, &options),
            Err(BalanceError::Overflow { .. })
        ));
    }
}
