//! Tolerant parsers for individual export fields.
//!
//! The brokerage export is hand-edited often enough that a bad cell must not
//! abort a run: every parser here resolves malformed text to zero instead of
//! returning an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{pct_to_rate, Rate, Shares};

// ---------------------------------------------------------------------------
// Quantity
// ---------------------------------------------------------------------------

/// Unit suffix attached to an exported share count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityUnit {
    One,
    /// `M`
    Ten,
    /// `MM`
    Hundred,
}

impl QuantityUnit {
    /// Case-insensitive match on the suffix token; anything unrecognised is `One`.
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("M") {
            QuantityUnit::Ten
        } else if token.eq_ignore_ascii_case("MM") {
            QuantityUnit::Hundred
        } else {
            QuantityUnit::One
        }
    }

    pub fn multiplier(&self) -> Shares {
        match self {
            QuantityUnit::One => 1,
            QuantityUnit::Ten => 10,
            QuantityUnit::Hundred => 100,
        }
    }
}

/// Parse a share count such as `"100"`, `"10M"` or `"5 MM"`.
///
/// Reads a leading (optionally signed) integer, then the next
/// whitespace-delimited token as the unit. No leading integer yields 0.
pub fn parse_quantity(text: &str) -> Shares {
    let s = text.trim_start();
    let int_end = signed_digits_end(s.as_bytes());
    if int_end == 0 {
        return 0;
    }

    let base = s[..int_end].parse::<Shares>().unwrap_or_else(|_| {
        if s.starts_with('-') {
            Shares::MIN
        } else {
            Shares::MAX
        }
    });

    let token = s[int_end..].split_whitespace().next().unwrap_or("");
    base.saturating_mul(QuantityUnit::from_token(token).multiplier())
}

/// Length of the `[+-]?[0-9]+` prefix, or 0 if there are no digits.
fn signed_digits_end(bytes: &[u8]) -> usize {
    let sign = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    let digits = count_digits(&bytes[sign..]);
    if digits == 0 {
        0
    } else {
        sign + digits
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

// ---------------------------------------------------------------------------
// Decimals
// ---------------------------------------------------------------------------

/// Parse the longest numeric prefix of `text`, `strtod` style.
///
/// Accepts leading whitespace, a sign, an integer part, a fractional part and
/// an exponent. Trailing text is ignored; no numeric prefix (or a value that
/// does not fit a `Decimal`) yields zero.
pub fn parse_decimal(text: &str) -> Decimal {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let int_digits = count_digits(&bytes[pos..]);
    let int_part = &s[pos..pos + int_digits];
    pos += int_digits;

    let mut frac_part = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_digits = count_digits(&bytes[pos + 1..]);
        frac_part = &s[pos + 1..pos + 1 + frac_digits];
        pos += 1 + frac_digits;
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return Decimal::ZERO;
    }

    let mut normalized = String::with_capacity(pos + 8);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_part);
    }

    let exponent = if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let exp_len = signed_digits_end(&bytes[pos + 1..]);
        (exp_len > 0).then(|| &s[pos + 1..pos + 1 + exp_len])
    } else {
        None
    };

    let parsed = match exponent {
        // An exponent too long for i64 is out of range either way.
        Some(exp) => match exp.trim_start_matches('+').parse::<i64>() {
            Ok(exp) => Decimal::from_scientific(&format!("{}e{}", normalized, exp)),
            Err(_) => return Decimal::ZERO,
        },
        None => Decimal::from_str(&normalized),
    };
    parsed.unwrap_or(Decimal::ZERO)
}

/// Parse a dividend yield cell such as `"3.5%"` into a fraction.
///
/// Anything from the first `%` onward is discarded. The remainder is always
/// read as a percentage, with or without the sign.
pub fn parse_yield(text: &str) -> Rate {
    let number = text.split('%').next().unwrap_or("");
    pct_to_rate(parse_decimal(number))
}
