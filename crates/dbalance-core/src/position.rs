//! A single holding as exported by the brokerage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate, Shares};

/// One row of the portfolio export, fully resolved.
///
/// Every field defaults to its zero value so that short rows still produce a
/// record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker symbol. Used as the exclusion key; not required to be unique.
    pub symbol: String,
    /// Share count after the unit multiplier has been applied.
    pub quantity: Shares,
    pub description: String,
    /// Last price per share.
    pub price: Money,
    /// 52-week high.
    pub yearly_high: Money,
    /// 52-week low.
    pub yearly_low: Money,
    /// Dividend yield as a fraction (0.032 = 3.2%).
    pub dividend_yield: Rate,
}

impl Position {
    /// `quantity × price`, or `None` if the product does not fit a `Decimal`.
    pub fn market_value(&self) -> Option<Money> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }

    pub fn pays_dividend(&self) -> bool {
        !self.dividend_yield.is_zero()
    }

    /// Yearly dividend income from this holding. `None` on overflow.
    pub fn income(&self) -> Option<Money> {
        if self.pays_dividend() {
            self.market_value()?.checked_mul(self.dividend_yield)
        } else {
            Some(Decimal::ZERO)
        }
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.symbol == symbol
    }
}
